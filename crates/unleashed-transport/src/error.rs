/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The controller answered with something other than 200.
    #[error("request to {path} returned status code {status}")]
    Status { status: u16, path: String },

    /// The HTTP client failed (connect, TLS, I/O).
    #[error("http request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// The redirect chain exceeded the configured bound.
    #[error("stopped after {limit} redirects")]
    RedirectLimit { limit: usize },

    /// The response body was larger than allowed.
    #[error("response body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },

    /// A controller URL could not be built.
    #[error("invalid url {0:?}: {1}")]
    InvalidUrl(String, #[source] url::ParseError),

    /// The caller's cancellation token fired.
    #[error("operation cancelled")]
    Cancelled,

    /// The caller's deadline elapsed.
    #[error("deadline elapsed")]
    TimedOut,
}
