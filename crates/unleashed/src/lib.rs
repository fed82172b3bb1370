//! # Unleashed
//!
//! Client for the web administration interface of Ruckus Unleashed
//! controllers.
//!
//! The controller speaks XML envelopes over HTTPS, guarded by a cookie
//! session and a CSRF token scraped from its login page. [`Client`] hides
//! all of that: every operation logs in on demand, follows the controller
//! when the master role moves to another host, and reports failures as one
//! [`Error`] classified by kind.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use unleashed::prelude::*;
//!
//! # async fn run() -> Result<(), unleashed::Error> {
//! let client = Client::builder()
//!     .host("unleashed.local")
//!     .credentials(Credentials::new("admin", "secret"))
//!     .accept_invalid_certs(true)
//!     .build()?;
//!
//! for wlan in client.wlans().list().await? {
//!     println!("{} ({:?})", wlan.name, wlan.encryption);
//! }
//!
//! let token = CancellationToken::new();
//! let stations = cancellable(&token, client.stations().list()).await?;
//! println!("{} stations", stations.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Layers
//!
//! ```text
//! resources (wlans, stations, sysinfo)
//!     ↕
//! Client (this crate)          ← dispatch, status check, error kinds
//!     ↕
//! unleashed-session            ← login, token gate, host tracking
//! unleashed-protocol           ← envelopes, scalar codecs
//!     ↕
//! unleashed-transport          ← HTTP, cookies, redirects
//! ```

mod cancel;
mod client;
mod error;
pub mod resources;

pub use cancel::{cancellable, with_deadline};
pub use client::{CMDSTAT_PATH, CONF_PATH, Client, ClientBuilder};
pub use error::Error;

pub use tokio_util::sync::CancellationToken;
pub use unleashed_protocol::{
    ConfAction, ConfResponse, RequestEnvelope, StatResponse, Xmsg, codec,
};
pub use unleashed_session::{
    ConcurrentRefresh, Credentials, LoginResult, SessionState,
    SingleFlightRefresh, TokenRefresh,
};
pub use unleashed_transport::{Scheme, TransportConfig, TransportError};

pub mod prelude {
    pub use crate::codec::{
        EnabledBool, IntBool, MacAddress, QueuePriority, Timestamp,
        WeeklySchedule,
    };
    pub use crate::resources::{
        Station, Sysinfo, Wlan, WlanAuthentication, WlanEncryption,
        WlanStatus,
    };
    pub use crate::{
        CancellationToken, Client, ClientBuilder, Credentials, Error,
        Scheme, SingleFlightRefresh, cancellable, with_deadline,
    };
}
