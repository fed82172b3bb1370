//! Wire protocol for the Unleashed web administration interface.
//!
//! This crate defines the "language" the controller speaks over its
//! `/admin/_conf.jsp` and `/admin/_cmdstat.jsp` endpoints:
//!
//! - **Envelopes** ([`RequestEnvelope`], [`ResponseEnvelope`],
//!   [`StatResponse`]): the `ajax-request` / `ajax-response` wrappers
//!   around every payload, including the in-band [`Xmsg`] error channel.
//! - **Scalar codecs** ([`codec`]): text encodings for values the
//!   controller represents unconventionally: `"enabled"` booleans, packed
//!   weekly schedules, comma-run time series and so on.
//! - **Errors** ([`EnvelopeError`], [`FormatError`]).
//!
//! # Architecture
//!
//! The protocol layer is pure: it turns typed values into bytes and back
//! and never touches the network. The client facade pairs it with the
//! session and transport layers.
//!
//! ```text
//! Transport (bytes) → Protocol (envelopes, codecs) → Resources (typed records)
//! ```

pub mod codec;
mod envelope;
mod error;

pub use codec::FormatError;
pub use envelope::{
    ConfAction, ConfResponse, EnvelopeKind, RequestEnvelope, ResponseEnvelope,
    StatResponse, Xmsg, check_well_formed,
};
pub use error::EnvelopeError;
