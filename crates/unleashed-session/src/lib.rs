//! Session management for Unleashed controllers.
//!
//! This crate owns the authenticated state of a client:
//!
//! 1. **Context**: host, credentials and the last [`LoginResult`], behind
//!    one lock ([`SessionContext`])
//! 2. **Login**: posting the form and reading the landing page
//!    ([`Session::login`])
//! 3. **Token gate**: reusing the CSRF token while a cookie backs it,
//!    logging in again when not ([`Session::ensure_token`], [`TokenRefresh`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Client (above)      ← asks for a token before every call
//!     ↕
//! Session (this crate) ← login state machine, host tracking
//!     ↕
//! Transport (below)   ← cookie jar, redirects, bytes
//! ```

mod context;
mod error;
mod refresh;
mod scrape;
mod session;

pub use context::{
    Credentials, LoginResult, SessionConfig, SessionContext, SessionState,
};
pub use error::SessionError;
pub use refresh::{ConcurrentRefresh, SingleFlightRefresh, TokenRefresh};
pub use session::{LOGIN_PATH, Session};
