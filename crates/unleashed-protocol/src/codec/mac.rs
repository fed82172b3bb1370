use std::fmt;
use std::str::FromStr;

use super::{FormatError, serde_via_text};

/// A 48-bit hardware address.
///
/// Decodes `aa:bb:cc:dd:ee:ff` or `aa-bb-cc-dd-ee-ff` in either case and
/// always encodes lowercase with colons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    pub fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for MacAddress {
    type Err = FormatError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| FormatError::InvalidMac {
            text: text.to_string(),
            reason,
        };

        // "xx:" * 5 + "xx"
        if text.len() != 17 {
            return Err(invalid("expected six two-digit octets"));
        }
        let separator = match text.as_bytes()[2] {
            sep @ (b':' | b'-') => sep as char,
            _ => return Err(invalid("expected ':' or '-' separators")),
        };

        let mut octets = [0u8; 6];
        let mut parts = text.split(separator);
        for octet in &mut octets {
            let part = parts.next().ok_or_else(|| invalid("too few octets"))?;
            if part.len() != 2 || !part.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid("octets must be two hex digits"));
            }
            *octet = u8::from_str_radix(part, 16)
                .map_err(|_| invalid("octets must be two hex digits"))?;
        }
        if parts.next().is_some() {
            return Err(invalid("too many octets"));
        }
        Ok(Self(octets))
    }
}

serde_via_text!(MacAddress);
