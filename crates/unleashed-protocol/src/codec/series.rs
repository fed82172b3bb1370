//! Flattened comma-separated time series.
//!
//! A series is one run of decimal tokens, `at,value[,value...]` repeated
//! with no record separator:
//!
//! ```text
//! 1700000000,1024,1700000060,2048        byte counters (arity 2)
//! 1700000000,5,2,0,1700000060,6,1,0      signal quality (arity 4)
//! ```
//!
//! Decoding is strict: the token count must be a multiple of the arity.
//! One trailing `,` is tolerated.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::timestamp::from_unix;
use super::{FormatError, parse_number, serde_via_text};

/// Splits a series into tokens. Empty text is an empty series, and a
/// single trailing separator ends the series.
fn tokens(text: &str) -> Vec<&str> {
    let text = text.strip_suffix(',').unwrap_or(text);
    if text.is_empty() {
        Vec::new()
    } else {
        text.split(',').collect()
    }
}

fn parse_at(token: &str) -> Result<DateTime<Utc>, FormatError> {
    from_unix(parse_number("timestamp", token)?)
}

// ---------------------------------------------------------------------------
// Byte counters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteSample {
    pub at: DateTime<Utc>,
    pub bytes: u64,
}

/// Byte counters sampled over time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ByteTimeSeries(pub Vec<ByteSample>);

impl fmt::Display for ByteTimeSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, sample) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{},{}", sample.at.timestamp(), sample.bytes)?;
        }
        Ok(())
    }
}

impl FromStr for ByteTimeSeries {
    type Err = FormatError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let tokens = tokens(text);
        if tokens.len() % 2 != 0 {
            return Err(FormatError::OddElements);
        }
        tokens
            .chunks_exact(2)
            .map(|record| {
                Ok(ByteSample {
                    at: parse_at(record[0])?,
                    bytes: parse_number("byte count", record[1])?,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

serde_via_text!(ByteTimeSeries);

// ---------------------------------------------------------------------------
// Signal quality
// ---------------------------------------------------------------------------

/// Station counts per signal-quality band at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalSample {
    pub at: DateTime<Utc>,
    pub excellent: u32,
    pub moderate: u32,
    pub poor: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignalTimeSeries(pub Vec<SignalSample>);

impl fmt::Display for SignalTimeSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, s) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(
                f,
                "{},{},{},{}",
                s.at.timestamp(),
                s.excellent,
                s.moderate,
                s.poor
            )?;
        }
        Ok(())
    }
}

impl FromStr for SignalTimeSeries {
    type Err = FormatError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let tokens = tokens(text);
        if tokens.len() % 4 != 0 {
            return Err(FormatError::IncompleteRecord { arity: 4 });
        }
        tokens
            .chunks_exact(4)
            .map(|record| {
                Ok(SignalSample {
                    at: parse_at(record[0])?,
                    excellent: parse_number("signal count", record[1])?,
                    moderate: parse_number("signal count", record[2])?,
                    poor: parse_number("signal count", record[3])?,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

serde_via_text!(SignalTimeSeries);
