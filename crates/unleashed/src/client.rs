//! `Client` builder and the envelope dispatch path.
//!
//! This is the entry point for talking to a controller. It ties together
//! all the layers: transport → session → protocol.

use serde::de::DeserializeOwned;
use unleashed_protocol::{
    ConfResponse, EnvelopeKind, RequestEnvelope, ResponseEnvelope,
    StatResponse, check_well_formed,
};
use unleashed_session::{
    ConcurrentRefresh, Credentials, LoginResult, Session, SessionConfig,
    TokenRefresh,
};
use unleashed_transport::{
    HttpRequest, HttpTransport, Scheme, Transport, TransportConfig,
    TransportError, endpoint,
};

use crate::Error;

/// Configuration endpoint (`getconf`, `setconf`, `addobj`, ...).
pub const CONF_PATH: &str = "/admin/_conf.jsp";

/// Statistics and command endpoint (`getstat`, `docmd`).
pub const CMDSTAT_PATH: &str = "/admin/_cmdstat.jsp";

/// Builder for configuring a [`Client`].
///
/// # Example
///
/// ```rust,no_run
/// use unleashed::prelude::*;
///
/// # async fn run() -> Result<(), unleashed::Error> {
/// let client = Client::builder()
///     .host("192.168.0.1")
///     .credentials(Credentials::new("admin", "secret"))
///     .accept_invalid_certs(true)
///     .build()?;
/// let info = client.sysinfo().await?;
/// println!("{} running {}", info.model, info.version);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    host: String,
    credentials: Credentials,
    transport: TransportConfig,
}

impl ClientBuilder {
    /// Creates a builder with default transport settings and no host.
    pub fn new() -> Self {
        Self {
            host: String::new(),
            credentials: Credentials::new("", ""),
            transport: TransportConfig::default(),
        }
    }

    /// Sets the controller authority (`host` or `host:port`).
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn scheme(mut self, scheme: Scheme) -> Self {
        self.transport.scheme = scheme;
        self
    }

    /// Accepts the controller's self-signed certificate.
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.transport.accept_invalid_certs = accept;
        self
    }

    pub fn max_redirects(mut self, max: usize) -> Self {
        self.transport.max_redirects = max;
        self
    }

    /// Caps every response body at `limit` bytes.
    pub fn body_limit(mut self, limit: usize) -> Self {
        self.transport.body_limit = limit;
        self
    }

    /// Replaces the whole transport configuration.
    pub fn transport_config(mut self, config: TransportConfig) -> Self {
        self.transport = config;
        self
    }

    /// Builds a client using the default [`ConcurrentRefresh`] strategy.
    ///
    /// # Errors
    /// Returns [`Error::Transport`] if the host does not form a URL or
    /// the HTTP client cannot be built.
    pub fn build(self) -> Result<Client, Error> {
        self.build_with_refresh(ConcurrentRefresh)
    }

    /// Builds a client with a chosen token refresh strategy.
    ///
    /// # Errors
    /// Same as [`build`](Self::build).
    pub fn build_with_refresh<R: TokenRefresh>(
        self,
        refresh: R,
    ) -> Result<Client<HttpTransport, R>, Error> {
        // Catch an unusable host here rather than on the first call.
        endpoint(self.transport.scheme, &self.host, "/")?;

        let config = SessionConfig {
            host: self.host,
            credentials: self.credentials,
        };
        let session =
            Session::connect_with_refresh(config, self.transport, refresh)?;
        Ok(Client::new(session))
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A client for one Unleashed controller.
///
/// Cheap to share behind an `Arc`: every method takes `&self` and the
/// session state is internally synchronized.
pub struct Client<T = HttpTransport, R = ConcurrentRefresh> {
    session: Session<T, R>,
}

impl Client {
    /// Creates a new builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }
}

impl<T: Transport, R: TokenRefresh> Client<T, R> {
    pub fn new(session: Session<T, R>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session<T, R> {
        &self.session
    }

    /// Logs in now, regardless of the cached token.
    ///
    /// # Errors
    /// [`Error::Auth`] if the controller refuses the credentials,
    /// [`Error::Protocol`] if the landing page cannot be read.
    pub async fn login(&self) -> Result<LoginResult, Error> {
        Ok(self.session.login().await?)
    }

    /// Returns a valid CSRF token, logging in first if needed.
    ///
    /// # Errors
    /// Propagates the login failure, if one was attempted.
    pub async fn ensure_token(&self) -> Result<String, Error> {
        Ok(self.session.ensure_token().await?)
    }

    /// Executes a configuration operation.
    ///
    /// Dropping the returned [`ConfResponse`] is the no-content success;
    /// call [`ConfResponse::decode`] to read a destination type.
    ///
    /// # Errors
    /// - [`Error::Transport`] on a non-200 status, before any decode
    /// - [`Error::Application`] when the controller sent an `xmsg`, even
    ///   if a payload came with it
    /// - [`Error::Decode`] when the envelope is malformed
    pub async fn conf(
        &self,
        envelope: RequestEnvelope,
    ) -> Result<ConfResponse, Error> {
        let body = self.post(&envelope).await?;
        Ok(ResponseEnvelope::decode(&body)?.into_result()?)
    }

    /// Executes a statistics operation and decodes the nested `response`
    /// element as `B`.
    ///
    /// There is no `xmsg` short-circuit here; `B` carries whatever status
    /// fields the caller needs to inspect.
    ///
    /// # Errors
    /// [`Error::Transport`] on a non-200 status, [`Error::Decode`] when
    /// the body does not match `B`.
    pub async fn stat<B: DeserializeOwned>(
        &self,
        envelope: RequestEnvelope,
    ) -> Result<StatResponse<B>, Error> {
        let body = self.post(&envelope).await?;
        Ok(StatResponse::decode(&body)?)
    }

    /// Executes a device command.
    ///
    /// The controller's echo is only checked for well-formedness.
    ///
    /// # Errors
    /// [`Error::Transport`] on a non-200 status, [`Error::Decode`] when
    /// the echo is not XML.
    pub async fn command(&self, envelope: RequestEnvelope) -> Result<(), Error> {
        let body = self.post(&envelope).await?;
        check_well_formed(&body)?;
        Ok(())
    }

    /// Fetches a literal resource, reading at most `limit` bytes.
    ///
    /// # Errors
    /// [`Error::Transport`] on a non-200 status or an oversized body.
    pub async fn get(&self, path: &str, limit: usize) -> Result<Vec<u8>, Error> {
        let token = self.session.ensure_token().await?;
        let request = HttpRequest::get(self.session.url(path)?)
            .csrf_token(token)
            .body_limit(limit);

        tracing::debug!(path, "fetching resource");
        let response = self.session.transport().send(request).await?;
        check_status(response.status, path)?;
        Ok(response.body)
    }

    /// Sends an envelope through the token gate to its endpoint and
    /// returns the 200 body.
    async fn post(&self, envelope: &RequestEnvelope) -> Result<Vec<u8>, Error> {
        let path = match envelope.kind() {
            EnvelopeKind::Conf => CONF_PATH,
            EnvelopeKind::Stat | EnvelopeKind::Command => CMDSTAT_PATH,
        };
        let xml = envelope.encode()?;
        let token = self.session.ensure_token().await?;
        let url = self.session.url(path)?;

        tracing::debug!(
            action = envelope.action(),
            comp = envelope.comp(),
            path,
            "dispatching envelope"
        );
        tracing::trace!(xml = %String::from_utf8_lossy(&xml), "request envelope");

        let request = HttpRequest::post(url, xml).csrf_token(token);
        let response = self.session.transport().send(request).await?;
        tracing::debug!(status = response.status, path, "envelope answered");
        check_status(response.status, path)?;

        tracing::trace!(
            xml = %String::from_utf8_lossy(&response.body),
            "response envelope"
        );
        Ok(response.body)
    }
}

fn check_status(status: u16, path: &str) -> Result<(), Error> {
    if status == 200 {
        return Ok(());
    }
    Err(TransportError::Status {
        status,
        path: path.to_string(),
    }
    .into())
}
