//! WLAN services: configuration records and live status.

use serde::{Deserialize, Serialize};
use unleashed_protocol::codec::{
    ByteTimeSeries, EnabledBool, IntBool, QueuePriority, SignalTimeSeries,
    WeeklySchedule,
};
use unleashed_protocol::{ConfAction, RequestEnvelope};
use unleashed_session::TokenRefresh;
use unleashed_transport::Transport;

use super::wire_enum;
use crate::{Client, Error};

const WLAN_COMP: &str = "wlansvc-list";

wire_enum! {
    /// How clients authenticate to the WLAN.
    #[derive(Default)]
    pub enum WlanAuthentication {
        #[default]
        Open => "open",
        Eap8021x => "802.1x-eap",
        MacAuth => "mac-auth",
    }
}

wire_enum! {
    #[derive(Default)]
    pub enum WlanEncryption {
        #[default]
        None => "none",
        Wpa2 => "wpa2",
        Wpa2Wpa3Mixed => "wpa23mixed",
        Wpa3 => "wpa3",
        Owe => "owe",
    }
}

wire_enum! {
    /// When the WLAN is broadcast.
    #[derive(Default)]
    pub enum WlanEnablement {
        #[default]
        AlwaysOn => "0",
        AlwaysOff => "1",
        /// Follow [`Wlan::schedule`].
        Scheduled => "2",
    }
}

/// Passphrase settings. Present for the WPA2 and WPA3 encryptions only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WlanWpa {
    #[serde(rename = "@x-passphrase")]
    pub x_passphrase: String,
    #[serde(rename = "@passphrase")]
    pub passphrase: String,
    #[serde(rename = "@cipher")]
    pub cipher: String,
    #[serde(rename = "@x-sae-passphrase")]
    pub x_sae_passphrase: String,
    #[serde(rename = "@sae-passphrase")]
    pub sae_passphrase: String,
    #[serde(rename = "@dynamic-psk")]
    pub dynamic_psk: EnabledBool,
    #[serde(rename = "@dynamic-psk-len")]
    pub dynamic_psk_len: String,
    #[serde(rename = "@dpsk-type")]
    pub dpsk_type: String,
}

/// Rate limiting presets. `"DISABLE"` turns a direction off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WlanQos {
    #[serde(rename = "@uplink-preset")]
    pub uplink_preset: String,
    #[serde(rename = "@downlink-preset")]
    pub downlink_preset: String,
    #[serde(rename = "@perssid-uplink-preset")]
    pub perssid_uplink_preset: u32,
    #[serde(rename = "@perssid-downlink-preset")]
    pub perssid_downlink_preset: u32,
}

impl Default for WlanQos {
    fn default() -> Self {
        Self {
            uplink_preset: "DISABLE".into(),
            downlink_preset: "DISABLE".into(),
            perssid_uplink_preset: 0,
            perssid_downlink_preset: 0,
        }
    }
}

/// A WLAN service (`wlansvc`).
///
/// Start from [`Wlan::new`] for a record the controller accepts; the
/// controller does not validate what it is sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "wlansvc", default)]
pub struct Wlan {
    /// Assigned by the controller. Never sent on create.
    #[serde(rename = "@id", skip_serializing_if = "Option::is_none")]
    pub id: Option<u32>,
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "@ssid")]
    pub ssid: String,
    #[serde(rename = "@description")]
    pub description: String,
    #[serde(rename = "@usage")]
    pub usage: String,
    #[serde(rename = "@is-guest")]
    pub is_guest: bool,
    #[serde(rename = "@authentication")]
    pub authentication: WlanAuthentication,
    #[serde(rename = "@encryption")]
    pub encryption: WlanEncryption,
    #[serde(rename = "@enable-type")]
    pub enable_type: WlanEnablement,
    #[serde(rename = "@allow-iot-connect")]
    pub allow_iot_connect: EnabledBool,
    #[serde(rename = "@acct-upd-interval")]
    pub acct_upd_interval: u32,
    #[serde(rename = "@close-system")]
    pub close_system: bool,
    #[serde(rename = "@vlan-id")]
    pub vlan_id: u32,
    #[serde(rename = "@dvlan")]
    pub dvlan: EnabledBool,
    #[serde(rename = "@max-clients-per-radio")]
    pub max_clients_per_radio: u32,
    #[serde(rename = "@do-wmm-ac")]
    pub do_wmm_ac: EnabledBool,
    #[serde(rename = "@acl-id")]
    pub acl_id: u32,
    #[serde(rename = "@fast-bss")]
    pub fast_bss: EnabledBool,
    #[serde(rename = "@bgscan")]
    pub bgscan: IntBool,
    #[serde(rename = "@band-balance")]
    pub band_balance: IntBool,
    #[serde(rename = "@do-802-11d")]
    pub do_802_11d: EnabledBool,
    #[serde(rename = "@force-dhcp")]
    pub force_dhcp: IntBool,
    #[serde(rename = "@force-dhcp-timeout")]
    pub force_dhcp_timeout: u32,
    #[serde(rename = "@max-idle-timeout")]
    pub max_idle_timeout: u32,
    #[serde(rename = "@idle-timeout")]
    pub idle_timeout: bool,
    #[serde(rename = "@client-isolation")]
    pub client_isolation: EnabledBool,
    #[serde(rename = "@dtim-period")]
    pub dtim_period: u32,
    #[serde(rename = "@directed-mbc")]
    pub directed_mbc: u32,
    #[serde(rename = "@wifi6")]
    pub wifi6: bool,
    #[serde(rename = "@do-802-11w")]
    pub do_802_11w: IntBool,
    #[serde(rename = "@tx-rate-config")]
    pub tx_rate_config: u32,
    #[serde(rename = "@sta-info-extraction")]
    pub sta_info_extraction: IntBool,
    #[serde(rename = "@local-bridge")]
    pub local_bridge: IntBool,
    #[serde(rename = "@precedence-id")]
    pub precedence_id: u32,

    #[serde(rename = "wpa", skip_serializing_if = "Option::is_none")]
    pub wpa: Option<WlanWpa>,
    #[serde(rename = "queue-priority")]
    pub queue_priority: QueuePriority,
    #[serde(rename = "qos")]
    pub qos: WlanQos,
    #[serde(rename = "wlan-schedule")]
    pub schedule: WeeklySchedule,
}

impl Wlan {
    /// An open, always-on WLAN named and broadcast as `name`, with the
    /// settings the web UI uses for a new WLAN.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: None,
            ssid: name.clone(),
            description: name.clone(),
            name,
            usage: "user".into(),
            acct_upd_interval: 10,
            vlan_id: 1,
            max_clients_per_radio: 100,
            acl_id: 1,
            do_802_11d: EnabledBool(true),
            force_dhcp_timeout: 10,
            max_idle_timeout: 300,
            idle_timeout: true,
            dtim_period: 1,
            directed_mbc: 1,
            wifi6: true,
            tx_rate_config: 1,
            sta_info_extraction: IntBool(true),
            precedence_id: 1,
            queue_priority: QueuePriority::High,
            schedule: WeeklySchedule::always_on(),
            ..Self::default()
        }
    }
}

/// Byte and signal-quality history of a WLAN.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WlanHistory {
    #[serde(rename = "@rx-bytes")]
    pub rx_bytes: ByteTimeSeries,
    #[serde(rename = "@tx-bytes")]
    pub tx_bytes: ByteTimeSeries,
    #[serde(rename = "@rssi")]
    pub rssi: SignalTimeSeries,
}

/// Live state of one WLAN.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WlanStatus {
    #[serde(rename = "@id")]
    pub id: u32,
    #[serde(rename = "@ssid")]
    pub ssid: String,
    /// Associated stations.
    #[serde(rename = "@assoc-stas")]
    pub assoc_stas: u32,
    #[serde(rename = "@state")]
    pub state: String,
    pub history: WlanHistory,
}

#[derive(Debug, Deserialize)]
struct WlanList {
    #[serde(rename = "wlansvc", default)]
    wlans: Vec<Wlan>,
}

#[derive(Serialize)]
#[serde(rename = "wlansvc")]
struct WlanRef {
    #[serde(rename = "@id")]
    id: u32,
}

#[derive(Serialize)]
#[serde(rename = "wlan")]
struct StatusQuery {
    #[serde(rename = "@LEVEL")]
    level: u32,
    #[serde(rename = "@PERIOD")]
    period: u32,
}

#[derive(Deserialize)]
struct StatusStat {
    #[serde(rename = "apstamgr-stat")]
    stat: StatusList,
}

#[derive(Deserialize)]
struct StatusList {
    #[serde(rename = "wlan", default)]
    wlans: Vec<WlanStatus>,
}

/// WLAN operations, from [`Client::wlans`].
pub struct Wlans<'a, T, R> {
    client: &'a Client<T, R>,
}

impl<T: Transport, R: TokenRefresh> Client<T, R> {
    pub fn wlans(&self) -> Wlans<'_, T, R> {
        Wlans { client: self }
    }
}

impl<T: Transport, R: TokenRefresh> Wlans<'_, T, R> {
    /// Lists every WLAN, passphrases in clear text.
    ///
    /// # Errors
    /// Any [`Error`] from the configuration path.
    pub async fn list(&self) -> Result<Vec<Wlan>, Error> {
        let envelope =
            RequestEnvelope::conf(ConfAction::GetConf, WLAN_COMP).decrypt(true);
        let list: WlanList = self.client.conf(envelope).await?.decode()?;
        Ok(list.wlans)
    }

    /// Creates a WLAN and returns it as stored, with its new id.
    ///
    /// Any id on `wlan` is ignored.
    ///
    /// # Errors
    /// Any [`Error`] from the configuration path.
    pub async fn create(&self, wlan: &Wlan) -> Result<Wlan, Error> {
        let wlan = Wlan {
            id: None,
            ..wlan.clone()
        };
        let envelope =
            RequestEnvelope::conf(ConfAction::AddObj, WLAN_COMP).payload(&wlan)?;
        let created: Wlan = self.client.conf(envelope).await?.decode()?;
        tracing::info!(id = ?created.id, name = %created.name, "wlan created");
        Ok(created)
    }

    /// Replaces the stored record with `wlan`, matched by id.
    ///
    /// # Errors
    /// Any [`Error`] from the configuration path.
    pub async fn update(&self, wlan: &Wlan) -> Result<(), Error> {
        let envelope =
            RequestEnvelope::conf(ConfAction::UpdObj, WLAN_COMP).payload(wlan)?;
        self.client.conf(envelope).await?;
        Ok(())
    }

    /// # Errors
    /// Any [`Error`] from the configuration path.
    pub async fn delete(&self, id: u32) -> Result<(), Error> {
        let envelope = RequestEnvelope::conf(ConfAction::DelObj, WLAN_COMP)
            .payload(&WlanRef { id })?;
        self.client.conf(envelope).await?;
        tracing::info!(id, "wlan deleted");
        Ok(())
    }

    /// Reads the live state of every WLAN over the last hour.
    ///
    /// # Errors
    /// Any [`Error`] from the statistics path.
    pub async fn statuses(&self) -> Result<Vec<WlanStatus>, Error> {
        let query = StatusQuery {
            level: 1,
            period: 3600,
        };
        let envelope = RequestEnvelope::stat("stamgr").payload(&query)?;
        let stat = self.client.stat::<StatusStat>(envelope).await?;
        Ok(stat.body.stat.wlans)
    }
}

#[cfg(test)]
mod tests {
    use unleashed_protocol::codec::{DAYS, SLOTS_PER_DAY};
    use unleashed_protocol::{FormatError, ResponseEnvelope, StatResponse};

    use super::*;

    fn encode(envelope: RequestEnvelope) -> String {
        String::from_utf8(envelope.encode().unwrap()).unwrap()
    }

    // =====================================================================
    // Wire enums
    // =====================================================================

    #[test]
    fn test_encryption_literals_round_trip() {
        for encryption in [
            WlanEncryption::None,
            WlanEncryption::Wpa2,
            WlanEncryption::Wpa2Wpa3Mixed,
            WlanEncryption::Wpa3,
            WlanEncryption::Owe,
        ] {
            assert_eq!(encryption.as_str().parse::<WlanEncryption>(), Ok(encryption));
        }
    }

    #[test]
    fn test_authentication_unknown_literal_is_format_error() {
        let result = "wep".parse::<WlanAuthentication>();
        assert!(matches!(
            result,
            Err(FormatError::InvalidLiteral { kind: "WlanAuthentication", .. })
        ));
    }

    #[test]
    fn test_enablement_is_numeric_on_the_wire() {
        assert_eq!(WlanEnablement::Scheduled.to_string(), "2");
        assert_eq!("1".parse(), Ok(WlanEnablement::AlwaysOff));
    }

    // =====================================================================
    // Wlan
    // =====================================================================

    #[test]
    fn test_new_wlan_uses_name_for_ssid_and_description() {
        let wlan = Wlan::new("office");

        assert_eq!(wlan.ssid, "office");
        assert_eq!(wlan.description, "office");
        assert_eq!(wlan.usage, "user");
        assert_eq!(wlan.vlan_id, 1);
        assert_eq!(wlan.max_clients_per_radio, 100);
        assert_eq!(wlan.queue_priority, QueuePriority::High);
        assert_eq!(wlan.qos.uplink_preset, "DISABLE");
        assert!(wlan.schedule.get(DAYS - 1, SLOTS_PER_DAY - 1));
        assert_eq!(wlan.id, None);
    }

    #[test]
    fn test_wlan_payload_writes_codecs_and_omits_missing_id() {
        let mut wlan = Wlan::new("lab");
        wlan.fast_bss = EnabledBool(true);
        wlan.band_balance = IntBool(true);
        wlan.encryption = WlanEncryption::Wpa2;
        wlan.wpa = Some(WlanWpa {
            passphrase: "correct horse".into(),
            cipher: "aes".into(),
            ..WlanWpa::default()
        });

        let xml = encode(
            RequestEnvelope::conf(ConfAction::AddObj, WLAN_COMP)
                .payload(&wlan)
                .unwrap(),
        );

        assert!(xml.contains("<wlansvc "), "{xml}");
        assert!(!xml.contains(" id="), "{xml}");
        assert!(xml.contains(r#"fast-bss="enabled""#), "{xml}");
        assert!(xml.contains(r#"band-balance="1""#), "{xml}");
        assert!(xml.contains(r#"encryption="wpa2""#), "{xml}");
        assert!(xml.contains(r#"enable-type="0""#), "{xml}");
        assert!(xml.contains(r#"passphrase="correct horse""#), "{xml}");
        assert!(
            xml.contains(r#"<queue-priority voice="0" video="2" data="4" background="6"/>"#),
            "{xml}"
        );
        assert!(xml.contains(r#"<wlan-schedule value="0xffffff:"#), "{xml}");
    }

    #[test]
    fn test_wlan_list_decodes_flags_priority_and_schedule() {
        let schedule = ["0x0"; 28].join(":");
        let body = format!(
            r#"<ajax-response><response type="object" id="wlansvc-list">
            <wlansvc-list>
              <wlansvc id="1" name="home" ssid="home" authentication="open"
                  encryption="wpa23mixed" enable-type="2" fast-bss="enabled"
                  bgscan="0" force-dhcp="1" is-guest="false">
                <wpa x-passphrase="s3cret!!" cipher="aes" dynamic-psk="disabled"/>
                <queue-priority voice="1" video="3" data="5" background="7"/>
                <qos uplink-preset="DISABLE" downlink-preset="DISABLE"
                    perssid-uplink-preset="0" perssid-downlink-preset="0"/>
                <wlan-schedule value="{schedule}"/>
              </wlansvc>
              <wlansvc id="2" name="guest" ssid="guest" encryption="none"/>
            </wlansvc-list>
            </response></ajax-response>"#
        );

        let list: WlanList = ResponseEnvelope::decode(body.as_bytes())
            .unwrap()
            .into_result()
            .unwrap()
            .decode()
            .unwrap();

        assert_eq!(list.wlans.len(), 2);
        let home = &list.wlans[0];
        assert_eq!(home.id, Some(1));
        assert_eq!(home.encryption, WlanEncryption::Wpa2Wpa3Mixed);
        assert_eq!(home.enable_type, WlanEnablement::Scheduled);
        assert_eq!(home.fast_bss, EnabledBool(true));
        assert_eq!(home.force_dhcp, IntBool(true));
        assert_eq!(home.queue_priority, QueuePriority::Low);
        assert_eq!(home.schedule, WeeklySchedule::new());
        assert_eq!(home.wpa.as_ref().unwrap().x_passphrase, "s3cret!!");

        let guest = &list.wlans[1];
        assert_eq!(guest.wpa, None);
        assert_eq!(guest.queue_priority, QueuePriority::High);
    }

    #[test]
    fn test_wlan_bad_flag_is_decode_error_naming_codec() {
        let body = br#"<ajax-response><response>
            <wlansvc-list><wlansvc id="1" fast-bss="yes"/></wlansvc-list>
            </response></ajax-response>"#;

        let result = ResponseEnvelope::decode(body)
            .unwrap()
            .into_result()
            .unwrap()
            .decode::<WlanList>();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("EnabledBool"), "{err}");
    }

    #[test]
    fn test_delete_payload_carries_only_id() {
        let xml = encode(
            RequestEnvelope::conf(ConfAction::DelObj, WLAN_COMP)
                .payload(&WlanRef { id: 7 })
                .unwrap(),
        );
        assert!(xml.contains(r#"<wlansvc id="7"/>"#), "{xml}");
    }

    // =====================================================================
    // Status
    // =====================================================================

    #[test]
    fn test_status_query_asks_for_one_hour() {
        let xml = encode(
            RequestEnvelope::stat("stamgr")
                .payload(&StatusQuery { level: 1, period: 3600 })
                .unwrap(),
        );
        assert!(xml.contains(r#"<wlan LEVEL="1" PERIOD="3600"/>"#), "{xml}");
    }

    #[test]
    fn test_status_decodes_histories() {
        let body = br#"<ajax-response><response type="object" id="stamgr">
            <apstamgr-stat>
              <wlan id="1" ssid="home" assoc-stas="3" state="up">
                <history rx-bytes="1700000000,100,1700000060,250"
                    tx-bytes="1700000000,40" rssi="1700000000,5,2,1"/>
              </wlan>
              <wlan id="2" ssid="guest" assoc-stas="0" state="down"/>
            </apstamgr-stat>
            </response></ajax-response>"#;

        let stat = StatResponse::<StatusStat>::decode(body).unwrap();
        let wlans = stat.body.stat.wlans;

        assert_eq!(wlans.len(), 2);
        assert_eq!(wlans[0].assoc_stas, 3);
        assert_eq!(wlans[0].history.rx_bytes.0.len(), 2);
        assert_eq!(wlans[0].history.rx_bytes.0[1].bytes, 250);
        assert_eq!(wlans[0].history.tx_bytes.0[0].bytes, 40);
        assert_eq!(wlans[0].history.rssi.0[0].excellent, 5);
        assert_eq!(wlans[1].history, WlanHistory::default());
    }
}
