//! Controller identity and firmware.

use serde::{Deserialize, Serialize};
use unleashed_protocol::RequestEnvelope;
use unleashed_session::TokenRefresh;
use unleashed_transport::Transport;

use crate::{Client, Error};

/// What the controller reports about itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Sysinfo {
    /// Seconds since boot.
    #[serde(rename = "@uptime")]
    pub uptime: u64,
    #[serde(rename = "@version")]
    pub version: String,
    #[serde(rename = "@version-num")]
    pub version_num: String,
    #[serde(rename = "@build-num")]
    pub build_num: String,
    #[serde(rename = "@model")]
    pub model: String,
    #[serde(rename = "@uuid")]
    pub uuid: String,
    #[serde(rename = "@serial")]
    pub serial: String,
    /// Largest number of APs the controller will manage.
    #[serde(rename = "@maxap")]
    pub max_ap: u32,
    #[serde(rename = "@fixed-ctry-code")]
    pub fixed_country_code: String,
    #[serde(rename = "@eth-num")]
    pub eth_num: u32,
    #[serde(rename = "@poe-port")]
    pub poe_port: String,
    #[serde(rename = "@max_connect_ap")]
    pub max_connect_ap: u32,
}

#[derive(Serialize)]
#[serde(rename = "sysinfo")]
struct SysinfoQuery {}

#[derive(Deserialize)]
struct SysinfoStat {
    response: SysinfoResponse,
}

#[derive(Deserialize)]
struct SysinfoResponse {
    sysinfo: Sysinfo,
}

impl<T: Transport, R: TokenRefresh> Client<T, R> {
    /// Reads the controller's identity.
    ///
    /// # Errors
    /// Any [`Error`] from the statistics path.
    pub async fn sysinfo(&self) -> Result<Sysinfo, Error> {
        let envelope = RequestEnvelope::stat("system").payload(&SysinfoQuery {})?;
        let stat = self.stat::<SysinfoStat>(envelope).await?;
        Ok(stat.body.response.sysinfo)
    }
}
