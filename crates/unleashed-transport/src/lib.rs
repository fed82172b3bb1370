//! HTTP transport layer for Unleashed.
//!
//! Provides the [`Transport`] trait that the session and envelope layers
//! send requests through, plus [`HttpTransport`], the `reqwest`-backed
//! implementation that owns the cookie jar and follows redirects.
//!
//! The transport knows nothing about logins or envelopes. It moves bytes,
//! keeps cookies, bounds response bodies, and reports every redirect hop to
//! a [`RedirectObserver`] so the session can re-pin its host.

mod config;
mod error;
mod http;

pub use config::{Scheme, TransportConfig};
pub use error::TransportError;
pub use http::HttpTransport;

use std::future::Future;

use url::Url;

/// Header carrying the CSRF token on every authenticated call.
pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// Content type declared on every POST.
///
/// The controller expects this even when the body is raw XML.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP method subset used by the controller protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// An outbound request, fully resolved against the current host.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub csrf_token: Option<String>,
    pub content_type: Option<&'static str>,
    pub body: Vec<u8>,
    /// Largest response body accepted before the read is aborted.
    pub body_limit: usize,
}

impl HttpRequest {
    /// Creates a GET request with the default body limit.
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::Get,
            url,
            csrf_token: None,
            content_type: None,
            body: Vec::new(),
            body_limit: config::DEFAULT_BODY_LIMIT,
        }
    }

    /// Creates a form-typed POST request carrying `body`.
    pub fn post(url: Url, body: Vec<u8>) -> Self {
        Self {
            method: Method::Post,
            url,
            csrf_token: None,
            content_type: Some(FORM_CONTENT_TYPE),
            body,
            body_limit: config::DEFAULT_BODY_LIMIT,
        }
    }

    /// Attaches the CSRF header value.
    pub fn csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    /// Overrides the response body limit.
    pub fn body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }
}

/// A response whose body has been read in full (within the limit).
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// The URL that finally answered, after redirects.
    pub url: Url,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// The controller only ever signals success with a plain 200.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Sends requests to the controller and answers cookie queries.
///
/// Implementations must be shareable across tasks; one transport serves
/// every concurrent caller of a client.
pub trait Transport: Send + Sync + 'static {
    /// Issues the request and reads the response body.
    ///
    /// # Errors
    /// - [`TransportError::Http`] on connection failures
    /// - [`TransportError::RedirectLimit`] when the redirect bound is hit
    /// - [`TransportError::BodyTooLarge`] when the body exceeds the limit
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;

    /// Returns `true` if the jar holds at least one cookie for `url`.
    fn has_cookies(&self, url: &Url) -> bool;

    /// The scheme used to reach the controller.
    fn scheme(&self) -> Scheme;
}

/// Receives the target authority of every redirect hop.
///
/// The session implements this to follow the controller when the master
/// role moves to another host.
pub trait RedirectObserver: Send + Sync + 'static {
    fn redirected(&self, authority: &str);
}

/// Builds `scheme://authority/path` for a controller endpoint.
///
/// # Errors
/// Returns [`TransportError::InvalidUrl`] if the authority does not parse.
pub fn endpoint(
    scheme: Scheme,
    authority: &str,
    path: &str,
) -> Result<Url, TransportError> {
    let raw = format!("{scheme}://{authority}{path}");
    Url::parse(&raw).map_err(|e| TransportError::InvalidUrl(raw, e))
}

/// Returns `host[:port]` for a URL, the form the session tracks.
pub fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}
