//! The session manager: login state machine and token gate.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use unleashed_transport::{
    HttpRequest, HttpTransport, Transport, TransportConfig, endpoint,
};
use url::{Url, form_urlencoded};

use crate::scrape::{self, LoginPage};
use crate::{
    ConcurrentRefresh, Credentials, LoginResult, SessionConfig, SessionContext,
    SessionError, SessionState, TokenRefresh,
};

/// Login form endpoint.
pub const LOGIN_PATH: &str = "/admin/login.jsp";

/// Value of the form's submit button, with a non-breaking space.
const LOGIN_BUTTON: &str = "Log\u{a0}in";

/// The landing page is small; anything bigger is not a login page.
const LOGIN_BODY_LIMIT: usize = 1 << 20;

/// Decrements the in-flight login count when the login future completes
/// or is dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// An authenticated connection to one controller.
///
/// Owns the transport and shares a [`SessionContext`] with the transport's
/// redirect policy, so a redirect to another host re-pins the session.
/// `R` decides how concurrent token refreshes behave.
///
/// ## Lifecycle
///
/// ```text
/// ensure_token() ─┬─ cached token + cookie ──→ token
///                 └─ otherwise ──→ login() ──→ token | error
/// ```
pub struct Session<T, R = ConcurrentRefresh> {
    transport: T,
    context: Arc<SessionContext>,
    refresh: R,
    logins_in_flight: AtomicUsize,
}

impl Session<HttpTransport> {
    /// Builds an HTTP session whose transport reports redirects back to
    /// the session.
    ///
    /// # Errors
    /// Returns [`SessionError::Transport`] if the HTTP client cannot be
    /// built.
    pub fn connect(
        config: SessionConfig,
        transport: TransportConfig,
    ) -> Result<Self, SessionError> {
        Self::connect_with_refresh(config, transport, ConcurrentRefresh)
    }
}

impl<R: TokenRefresh> Session<HttpTransport, R> {
    /// Like [`connect`](Session::connect), with a chosen refresh strategy.
    ///
    /// # Errors
    /// Returns [`SessionError::Transport`] if the HTTP client cannot be
    /// built.
    pub fn connect_with_refresh(
        config: SessionConfig,
        transport: TransportConfig,
        refresh: R,
    ) -> Result<Self, SessionError> {
        let context = Arc::new(SessionContext::new(config));
        let transport = HttpTransport::new(transport, context.clone())?;
        Ok(Self::with_refresh(context, transport, refresh))
    }
}

impl<T: Transport> Session<T> {
    /// Wraps an existing transport. The transport should report redirects
    /// to `context`.
    pub fn new(context: Arc<SessionContext>, transport: T) -> Self {
        Self::with_refresh(context, transport, ConcurrentRefresh)
    }
}

impl<T: Transport, R: TokenRefresh> Session<T, R> {
    pub fn with_refresh(
        context: Arc<SessionContext>,
        transport: T,
        refresh: R,
    ) -> Self {
        Self {
            transport,
            context,
            refresh,
            logins_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        &self.context
    }

    /// Current controller authority, after any redirects.
    pub fn host(&self) -> String {
        self.context.host()
    }

    pub fn login_result(&self) -> Option<LoginResult> {
        self.context.login_result()
    }

    pub fn set_credentials(&self, credentials: Credentials) {
        self.context.set_credentials(credentials);
    }

    /// Resolves `path` against the current host.
    ///
    /// # Errors
    /// Returns [`SessionError::Transport`] if the host does not form a
    /// valid URL.
    pub fn url(&self, path: &str) -> Result<Url, SessionError> {
        Ok(endpoint(self.transport.scheme(), &self.context.host(), path)?)
    }

    /// Computes the authentication state.
    pub fn state(&self) -> SessionState {
        if self.logins_in_flight.load(Ordering::SeqCst) > 0 {
            SessionState::Authenticating
        } else if self.cached_token().is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        }
    }

    /// The cached token, if it is still backed by a cookie for the current
    /// host.
    pub fn cached_token(&self) -> Option<String> {
        let (token, host) = self.context.token_and_host();
        let token = token?;
        let root = endpoint(self.transport.scheme(), &host, "/").ok()?;
        self.transport.has_cookies(&root).then_some(token)
    }

    /// Returns a valid token, logging in first if needed.
    ///
    /// # Errors
    /// Propagates the login failure, if one was attempted.
    pub async fn ensure_token(&self) -> Result<String, SessionError> {
        self.refresh.ensure_token(self).await
    }

    /// Posts the credentials and records the result.
    ///
    /// # Errors
    /// - [`SessionError::Rejected`] when the controller refuses the login
    /// - [`SessionError::BadResponse`] when the landing page has no script
    ///   or no CSRF token
    /// - [`SessionError::Transport`] when the round trip fails
    pub async fn login(&self) -> Result<LoginResult, SessionError> {
        let _in_flight = InFlight::enter(&self.logins_in_flight);
        let (host, credentials, stale_token) = self.context.login_snapshot();

        let url = endpoint(self.transport.scheme(), &host, LOGIN_PATH)?;
        let form = form_urlencoded::Serializer::new(String::new())
            .append_pair("username", &credentials.username)
            .append_pair("password", &credentials.password)
            .append_pair("ok", LOGIN_BUTTON)
            .finish();
        let mut request = HttpRequest::post(url, form.into_bytes())
            .body_limit(LOGIN_BODY_LIMIT);
        if let Some(token) = stale_token.filter(|t| !t.is_empty()) {
            request = request.csrf_token(token);
        }

        tracing::debug!(host = %host, username = %credentials.username, "logging in");
        let response = self.transport.send(request).await?;
        let page = String::from_utf8_lossy(&response.body);

        let page = scrape::parse_login_page(&page)
            .map_err(|_| SessionError::BadResponse("login patterns failed to compile"))?;
        let fields = match page {
            LoginPage::Script(fields) => fields,
            LoginPage::Rejected(reason) => {
                tracing::warn!(host = %host, reason = %reason, "login rejected");
                return Err(SessionError::Rejected(reason));
            }
            LoginPage::NoScript => {
                return Err(SessionError::BadResponse("no script in login response"));
            }
        };
        let csrf_token = fields
            .csrf_token
            .ok_or(SessionError::BadResponse("login response carried no CSRF token"))?;

        let result = LoginResult {
            privilege: fields.privilege,
            version: fields.version,
            csrf_token,
        };
        self.context.store_login(result.clone());
        tracing::info!(
            host = %self.context.host(),
            privilege = ?result.privilege,
            version = ?result.version,
            "logged in"
        );
        Ok(result)
    }
}
