//! Boolean flags in the two spellings the controller uses.

use std::fmt;
use std::str::FromStr;

use super::{FormatError, serde_via_text};

/// A boolean written as `"enabled"` / `"disabled"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct EnabledBool(pub bool);

impl fmt::Display for EnabledBool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.0 { "enabled" } else { "disabled" })
    }
}

impl FromStr for EnabledBool {
    type Err = FormatError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "enabled" => Ok(Self(true)),
            "disabled" => Ok(Self(false)),
            _ => Err(FormatError::InvalidLiteral {
                kind: "EnabledBool",
                text: text.to_string(),
            }),
        }
    }
}

impl From<bool> for EnabledBool {
    fn from(value: bool) -> Self {
        Self(value)
    }
}

impl From<EnabledBool> for bool {
    fn from(value: EnabledBool) -> Self {
        value.0
    }
}

serde_via_text!(EnabledBool);

/// A boolean written as a single `"1"` / `"0"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct IntBool(pub bool);

impl fmt::Display for IntBool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.0 { "1" } else { "0" })
    }
}

impl FromStr for IntBool {
    type Err = FormatError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text {
            "1" => Ok(Self(true)),
            "0" => Ok(Self(false)),
            _ => Err(FormatError::InvalidLiteral {
                kind: "IntBool",
                text: text.to_string(),
            }),
        }
    }
}

impl From<bool> for IntBool {
    fn from(value: bool) -> Self {
        Self(value)
    }
}

impl From<IntBool> for bool {
    fn from(value: IntBool) -> Self {
        value.0
    }
}

serde_via_text!(IntBool);
