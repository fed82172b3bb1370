//! Token refresh strategies.
//!
//! "Ensure token" is a check-then-login: use the cached token if the jar
//! still holds a cookie for the current host, log in otherwise. The two
//! strategies differ only in what concurrent callers do when they all see
//! a stale token at once.

use std::future::Future;

use tokio::sync::Mutex;
use unleashed_transport::Transport;

use crate::{Session, SessionError};

/// Produces a CSRF token that is valid for the current host.
///
/// # Example
///
/// A strategy that always logs in, ignoring the cache:
///
/// ```rust
/// use unleashed_session::{Session, SessionError, TokenRefresh};
/// use unleashed_transport::Transport;
///
/// struct AlwaysLogin;
///
/// impl TokenRefresh for AlwaysLogin {
///     async fn ensure_token<T: Transport>(
///         &self,
///         session: &Session<T, Self>,
///     ) -> Result<String, SessionError> {
///         Ok(session.login().await?.csrf_token)
///     }
/// }
/// ```
pub trait TokenRefresh: Sized + Send + Sync + 'static {
    /// Returns a usable token, logging in if the cached one is stale.
    ///
    /// # Errors
    /// Whatever the login returned; nothing is retried.
    fn ensure_token<T: Transport>(
        &self,
        session: &Session<T, Self>,
    ) -> impl Future<Output = Result<String, SessionError>> + Send;
}

/// Plain check-then-login.
///
/// Concurrent callers that all find the token stale each log in. Every
/// login re-establishes the cookie and token, so the duplicates are
/// harmless, only wasteful.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcurrentRefresh;

impl TokenRefresh for ConcurrentRefresh {
    async fn ensure_token<T: Transport>(
        &self,
        session: &Session<T, Self>,
    ) -> Result<String, SessionError> {
        if let Some(token) = session.cached_token() {
            return Ok(token);
        }
        Ok(session.login().await?.csrf_token)
    }
}

/// Coalesces concurrent logins into one.
///
/// Callers that find the token stale queue on an async gate. The first
/// one through logs in; the rest re-check the cache after acquiring the
/// gate and reuse its result. The session's state lock is never held
/// across the login.
#[derive(Debug, Default)]
pub struct SingleFlightRefresh {
    gate: Mutex<()>,
}

impl SingleFlightRefresh {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenRefresh for SingleFlightRefresh {
    async fn ensure_token<T: Transport>(
        &self,
        session: &Session<T, Self>,
    ) -> Result<String, SessionError> {
        if let Some(token) = session.cached_token() {
            return Ok(token);
        }

        let _gate = self.gate.lock().await;
        if let Some(token) = session.cached_token() {
            tracing::debug!("token refreshed by a concurrent caller");
            return Ok(token);
        }
        Ok(session.login().await?.csrf_token)
    }
}
