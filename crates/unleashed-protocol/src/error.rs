//! Error types for the envelope layer.
//!
//! Scalar codec failures have their own type, [`FormatError`](crate::FormatError),
//! because codecs are also used on their own through `FromStr`.

use crate::Xmsg;

/// Errors that can occur while building or reading an envelope.
#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    /// Serialization of the request or its payload failed.
    #[error("encode failed: {0}")]
    Encode(String),

    /// The response was not well-formed, had the wrong shape, or its
    /// payload did not match the requested type.
    ///
    /// A codec rejecting a field inside the payload also lands here, with
    /// the codec's message carried through serde.
    #[error("decode failed: {0}")]
    Decode(String),

    /// The controller answered with a structured `xmsg` error.
    #[error(transparent)]
    Application(#[from] Xmsg),
}

impl EnvelopeError {
    pub(crate) fn encode(err: impl std::fmt::Display) -> Self {
        Self::Encode(err.to_string())
    }

    pub(crate) fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }
}
