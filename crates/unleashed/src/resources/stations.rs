//! Associated clients ("stations") and the commands that act on them.

use serde::{Deserialize, Serialize};
use unleashed_protocol::RequestEnvelope;
use unleashed_protocol::codec::{IntBool, MacAddress, Timestamp};
use unleashed_session::TokenRefresh;
use unleashed_transport::Transport;

use crate::{Client, Error};

const STATION_COMP: &str = "stamgr";

/// A station as the controller currently sees it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Station {
    // Far side
    #[serde(rename = "@mac")]
    pub mac: MacAddress,
    #[serde(rename = "@status")]
    pub status: i32,
    #[serde(rename = "@ext-status")]
    pub ext_status: i32,
    #[serde(rename = "@first-assoc")]
    pub first_assoc: Option<Timestamp>,

    // Near side
    #[serde(rename = "@ap")]
    pub ap: MacAddress,
    #[serde(rename = "@ap-name")]
    pub ap_name: String,
    #[serde(rename = "@user")]
    pub user: String,
    #[serde(rename = "@location")]
    pub location: String,

    #[serde(rename = "@wlan-id")]
    pub wlan_id: u32,
    #[serde(rename = "@wlan")]
    pub wlan: String,
    #[serde(rename = "@ssid")]
    pub ssid: String,
    /// BSSID the station is associated with.
    #[serde(rename = "@vap-mac")]
    pub vap_mac: MacAddress,
    #[serde(rename = "@encryption")]
    pub encryption: String,

    #[serde(rename = "@ip")]
    pub ip: String,
    #[serde(rename = "@ipv6")]
    pub ipv6: String,
    #[serde(rename = "@vlan")]
    pub vlan: u32,
    #[serde(rename = "@description")]
    pub description: String,
    #[serde(rename = "@hostname")]
    pub hostname: String,
    /// Name before any rename.
    #[serde(rename = "@oldname")]
    pub original_name: String,

    // Fingerprinting
    #[serde(rename = "@dvcinfo")]
    pub device_info: String,
    #[serde(rename = "@dvctype")]
    pub device_type: String,
    #[serde(rename = "@model")]
    pub model: String,

    #[serde(rename = "@favourite")]
    pub favourite: IntBool,
    /// Marked as an IoT ("legacy") device.
    #[serde(rename = "@iot")]
    pub legacy: IntBool,
    #[serde(rename = "@blocked")]
    pub blocked: IntBool,

    // Radio
    #[serde(rename = "@channelization")]
    pub channelization: String,
    #[serde(rename = "@radio-type-text")]
    pub radio_type_text: String,
    #[serde(rename = "@rssi")]
    pub rssi: i32,
    #[serde(rename = "@received-signal-strength")]
    pub received_signal_strength: i32,
    #[serde(rename = "@noise-floor")]
    pub noise_floor: i32,
    #[serde(rename = "@rssi-level")]
    pub rssi_level: String,
    #[serde(rename = "@auth-method")]
    pub auth_method: String,
    #[serde(rename = "@avg-rssi")]
    pub avg_rssi: i32,
    #[serde(rename = "@channel")]
    pub channel: u32,
    #[serde(rename = "@radio-type")]
    pub radio_type: String,
    #[serde(rename = "@radio-band")]
    pub radio_band: String,

    // Counters
    #[serde(rename = "@total-rx-pkts")]
    pub total_rx_pkts: u64,
    #[serde(rename = "@total-tx-pkts")]
    pub total_tx_pkts: u64,
    #[serde(rename = "@total-rx-bytes")]
    pub total_rx_bytes: u64,
    #[serde(rename = "@total-tx-bytes")]
    pub total_tx_bytes: u64,
    #[serde(rename = "@total-usage-bytes")]
    pub total_usage_bytes: u64,
    #[serde(rename = "@total-retries")]
    pub total_retries: u64,
    #[serde(rename = "@tx-drop-data")]
    pub tx_drop_data: u64,
}

#[derive(Serialize)]
#[serde(rename = "client")]
struct ClientQuery<'a> {
    #[serde(rename = "@wlan", skip_serializing_if = "Option::is_none")]
    wlan: Option<&'a str>,
    #[serde(rename = "@USE_REGEX", skip_serializing_if = "Option::is_none")]
    use_regex: Option<bool>,
}

#[derive(Deserialize)]
struct StationStat {
    #[serde(rename = "apstamgr-stat")]
    stat: StationList,
}

#[derive(Deserialize)]
struct StationList {
    #[serde(rename = "client", default)]
    clients: Vec<Station>,
}

/// A `docmd` addressed to one station.
#[derive(Debug, Serialize)]
#[serde(rename = "xcmd")]
struct StationCommand<'a> {
    #[serde(rename = "@cmd")]
    cmd: &'static str,
    #[serde(rename = "@tag")]
    tag: &'static str,
    #[serde(rename = "@enable", skip_serializing_if = "Option::is_none")]
    enable: Option<IntBool>,
    #[serde(rename = "@client")]
    client: MacAddress,
    #[serde(rename = "@rename", skip_serializing_if = "Option::is_none")]
    rename: Option<&'a str>,
}

impl<'a> StationCommand<'a> {
    fn toggle(cmd: &'static str, client: MacAddress, enable: bool) -> Self {
        Self {
            cmd,
            tag: "client",
            enable: Some(IntBool(enable)),
            client,
            rename: None,
        }
    }

    fn rename(client: MacAddress, name: &'a str) -> Self {
        Self {
            cmd: "rename",
            tag: "client",
            enable: None,
            client,
            rename: Some(name),
        }
    }
}

/// Station operations, from [`Client::stations`].
pub struct Stations<'a, T, R> {
    client: &'a Client<T, R>,
}

impl<T: Transport, R: TokenRefresh> Client<T, R> {
    pub fn stations(&self) -> Stations<'_, T, R> {
        Stations { client: self }
    }
}

impl<T: Transport, R: TokenRefresh> Stations<'_, T, R> {
    /// Lists every associated station.
    ///
    /// # Errors
    /// Any [`Error`] from the statistics path.
    pub async fn list(&self) -> Result<Vec<Station>, Error> {
        self.query(ClientQuery {
            wlan: None,
            use_regex: None,
        })
        .await
    }

    /// Lists the stations on the WLAN named `wlan`, matched literally.
    ///
    /// # Errors
    /// Any [`Error`] from the statistics path.
    pub async fn list_by_wlan(&self, wlan: &str) -> Result<Vec<Station>, Error> {
        self.query(ClientQuery {
            wlan: Some(wlan),
            use_regex: Some(false),
        })
        .await
    }

    /// # Errors
    /// Any [`Error`] from the command path.
    pub async fn set_favourite(
        &self,
        station: MacAddress,
        favourite: bool,
    ) -> Result<(), Error> {
        self.command(StationCommand::toggle("favourite", station, favourite))
            .await
    }

    /// Marks or unmarks the station as an IoT device.
    ///
    /// # Errors
    /// Any [`Error`] from the command path.
    pub async fn set_legacy(
        &self,
        station: MacAddress,
        legacy: bool,
    ) -> Result<(), Error> {
        self.command(StationCommand::toggle("mark-iot", station, legacy))
            .await
    }

    /// Gives the station a display name. An empty name forgets the
    /// station.
    ///
    /// # Errors
    /// Any [`Error`] from the command path.
    pub async fn rename(&self, station: MacAddress, name: &str) -> Result<(), Error> {
        self.command(StationCommand::rename(station, name)).await
    }

    async fn query(&self, query: ClientQuery<'_>) -> Result<Vec<Station>, Error> {
        let envelope = RequestEnvelope::stat(STATION_COMP).payload(&query)?;
        let stat = self.client.stat::<StationStat>(envelope).await?;
        Ok(stat.body.stat.clients)
    }

    async fn command(&self, command: StationCommand<'_>) -> Result<(), Error> {
        tracing::debug!(cmd = command.cmd, station = %command.client, "station command");
        let envelope = RequestEnvelope::command(STATION_COMP).payload(&command)?;
        self.client.command(envelope).await
    }
}
