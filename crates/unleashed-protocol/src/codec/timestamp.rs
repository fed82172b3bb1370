use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::{FormatError, parse_number, serde_via_text};

/// A UTC instant written as decimal Unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    /// Builds a timestamp from Unix seconds.
    ///
    /// # Errors
    /// Returns [`FormatError::OutOfRange`] if chrono cannot represent it.
    pub fn from_unix(secs: i64) -> Result<Self, FormatError> {
        from_unix(secs).map(Self)
    }

    pub fn unix(&self) -> i64 {
        self.0.timestamp()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.unix())
    }
}

impl FromStr for Timestamp {
    type Err = FormatError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::from_unix(parse_number("timestamp", text)?)
    }
}

serde_via_text!(Timestamp);

pub(super) fn from_unix(secs: i64) -> Result<DateTime<Utc>, FormatError> {
    DateTime::from_timestamp(secs, 0).ok_or(FormatError::OutOfRange {
        kind: "timestamp",
        value: secs,
    })
}
