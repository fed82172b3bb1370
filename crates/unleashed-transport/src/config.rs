//! Transport configuration.

use std::fmt;

/// Default cap on response bodies (10 MiB).
pub(crate) const DEFAULT_BODY_LIMIT: usize = 10 << 20;

/// Default number of redirect hops followed before giving up.
pub(crate) const DEFAULT_MAX_REDIRECTS: usize = 10;

/// URL scheme used to reach the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    /// Plain HTTP. Only useful for test harnesses and lab setups.
    Http,
    #[default]
    Https,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http => write!(f, "http"),
            Self::Https => write!(f, "https"),
        }
    }
}

/// Configuration for [`HttpTransport`](crate::HttpTransport).
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub scheme: Scheme,

    /// Redirect hops followed before the request fails.
    ///
    /// Default: 10.
    pub max_redirects: usize,

    /// Largest response body read before the request fails.
    ///
    /// Default: 10 MiB.
    pub body_limit: usize,

    /// Accept self-signed or otherwise unverifiable certificates.
    ///
    /// Controllers ship with a self-signed certificate, so this is often
    /// needed in practice. Default: `false`.
    pub accept_invalid_certs: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            scheme: Scheme::Https,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            body_limit: DEFAULT_BODY_LIMIT,
            accept_invalid_certs: false,
        }
    }
}
