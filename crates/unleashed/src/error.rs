//! Unified error type for the Unleashed client.

use unleashed_protocol::{EnvelopeError, FormatError, Xmsg};
use unleashed_session::SessionError;
use unleashed_transport::TransportError;

/// Every failure a client operation can report.
///
/// The per-layer errors are classified by kind rather than by the crate
/// they came from, so callers can tell a refused login from an unreachable
/// controller from an error the controller reported in-band. `?` converts
/// the sub-crate errors through the `From` impls below.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The HTTP exchange failed: connection, non-200 status, oversized
    /// body, cancellation or deadline.
    #[error(transparent)]
    Transport(TransportError),

    /// The response was not the XML we expected.
    #[error("decode error: {0}")]
    Decode(String),

    /// The controller returned a structured `xmsg` error.
    #[error(transparent)]
    Application(Xmsg),

    /// The controller refused the login, for the stated reason.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// A scalar codec rejected wire text.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// The controller broke the protocol: a redirect loop, or a login page
    /// we could not read.
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::RedirectLimit { .. } => Self::Protocol(err.to_string()),
            other => Self::Transport(other),
        }
    }
}

impl From<SessionError> for Error {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Rejected(reason) => Self::Auth(reason),
            SessionError::BadResponse(what) => Self::Protocol(what.to_string()),
            SessionError::Transport(err) => err.into(),
        }
    }
}

impl From<EnvelopeError> for Error {
    fn from(err: EnvelopeError) -> Self {
        match err {
            EnvelopeError::Encode(msg) | EnvelopeError::Decode(msg) => {
                Self::Decode(msg)
            }
            EnvelopeError::Application(xmsg) => Self::Application(xmsg),
        }
    }
}
