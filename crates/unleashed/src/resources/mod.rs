//! Typed records for the controller's configuration and statistics.
//!
//! Each resource is a flat mapping of wire attributes onto Rust fields,
//! with the scalar codecs from [`unleashed_protocol::codec`] where the
//! controller uses its own encodings. Values are passed through as the
//! controller reports them; nothing here validates them.

mod stations;
mod sysinfo;
mod wlans;

pub use stations::{Station, Stations};
pub use sysinfo::Sysinfo;
pub use wlans::{
    Wlan, WlanAuthentication, WlanEnablement, WlanEncryption, WlanHistory,
    WlanQos, WlanStatus, WlanWpa, Wlans,
};

/// Declares an enum that is written on the wire as one of a fixed set of
/// literals, with `Display`, `FromStr` and serde going through the literal.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)+
        }

        impl $name {
            /// The wire literal.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = unleashed_protocol::FormatError;

            fn from_str(text: &str) -> Result<Self, Self::Err> {
                match text {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(unleashed_protocol::FormatError::InvalidLiteral {
                        kind: stringify!($name),
                        text: text.to_string(),
                    }),
                }
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(
                deserializer: D,
            ) -> Result<Self, D::Error> {
                let text = <String as serde::Deserialize>::deserialize(deserializer)?;
                text.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use wire_enum;
