//! Scalar codecs for values the controller encodes unconventionally.
//!
//! Each type converts between its wire text and a typed value:
//!
//! - [`FromStr`](std::str::FromStr) decodes, failing with [`FormatError`]
//! - [`Display`](std::fmt::Display) encodes
//! - serde goes through the text form, so the types can sit directly in
//!   quick-xml attribute fields (`#[serde(rename = "@flag")]`)
//!
//! [`QueuePriority`] and [`WeeklySchedule`] are the exceptions: on the wire
//! they are whole elements, and their serde impls produce those elements.

mod flag;
mod mac;
mod priority;
mod schedule;
mod series;
mod timestamp;

pub use flag::{EnabledBool, IntBool};
pub use mac::MacAddress;
pub use priority::{PriorityTuple, QueuePriority};
pub use schedule::{DAYS, SLOTS_PER_DAY, WeeklySchedule};
pub use series::{ByteSample, ByteTimeSeries, SignalSample, SignalTimeSeries};
pub use timestamp::Timestamp;

use std::num::ParseIntError;

/// A codec rejected its input text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The text is not one of the codec's literals.
    #[error("invalid {kind}: {text:?}")]
    InvalidLiteral { kind: &'static str, text: String },

    /// A numeric token did not parse.
    #[error("invalid {kind} number {text:?}: {source}")]
    InvalidNumber {
        kind: &'static str,
        text: String,
        #[source]
        source: ParseIntError,
    },

    #[error("invalid hardware address {text:?}: {reason}")]
    InvalidMac { text: String, reason: &'static str },

    /// A number parsed but cannot be represented.
    #[error("{kind} value {value} out of range")]
    OutOfRange { kind: &'static str, value: i64 },

    /// A byte time series ended half-way through a record.
    #[error("invalid time series: odd number of elements")]
    OddElements,

    /// A time series' token count is not a multiple of its record size.
    #[error("invalid time series: number of elements not divisible by {arity}")]
    IncompleteRecord { arity: usize },

    #[error("invalid schedule: {0}")]
    Schedule(&'static str),

    /// A priority element matched neither known tuple.
    #[error(
        "queue priority ({voice}, {video}, {data}, {background}) is neither high nor low"
    )]
    UnknownPriority {
        voice: i32,
        video: i32,
        data: i32,
        background: i32,
    },
}

/// Implements serde for a type through its `Display`/`FromStr` text form.
macro_rules! serde_via_text {
    ($ty:ty) => {
        impl serde::Serialize for $ty {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> serde::Deserialize<'de> for $ty {
            fn deserialize<D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> Result<Self, D::Error> {
                let text = <String as serde::Deserialize>::deserialize(deserializer)?;
                text.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use serde_via_text;

/// Parses a decimal integer, tagging failures with the codec's name.
fn parse_number<N>(kind: &'static str, text: &str) -> Result<N, FormatError>
where
    N: std::str::FromStr<Err = ParseIntError>,
{
    text.parse().map_err(|source| FormatError::InvalidNumber {
        kind,
        text: text.to_string(),
        source,
    })
}
