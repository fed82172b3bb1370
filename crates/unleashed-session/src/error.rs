//! Error types for the session layer.

use unleashed_transport::TransportError;

/// Errors that can occur while logging in or refreshing the token.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The controller explicitly rejected the credentials. Carries the
    /// reason from the login page's `X-Auth` meta tag.
    #[error("login rejected: {0:?}")]
    Rejected(String),

    /// The login page could not be interpreted: no script to read the
    /// session variables from, or no CSRF token in it.
    #[error("login failed: {0}")]
    BadResponse(&'static str),

    /// The login round trip itself failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
