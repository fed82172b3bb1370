//! Shared session state: who we are, where the controller is, and what the
//! last login produced.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use unleashed_transport::RedirectObserver;

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// Login credentials. `Debug` never prints the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// LoginResult
// ---------------------------------------------------------------------------

/// What a successful login extracted from the controller's landing page.
///
/// Replaced wholesale by the next login, never patched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResult {
    /// Privilege level of the account (`"rw"`, `"ro"`, ...), if present.
    pub privilege: Option<String>,
    /// Web UI frame version, if present.
    pub version: Option<String>,
    pub csrf_token: String,
}

// ---------------------------------------------------------------------------
// SessionConfig / SessionState
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Initial controller authority (`host` or `host:port`). Redirects may
    /// move it later.
    pub host: String,
    pub credentials: Credentials,
}

/// Authentication state, derived on demand.
///
/// ```text
/// Unauthenticated ──(login)──→ Authenticating ──(ok)──→ Authenticated
///        ↑                                                   │
///        └──────────────(no cookie for current host)─────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    /// A login round trip is in flight.
    Authenticating,
    /// A token is cached and the jar holds a cookie for the current host.
    Authenticated,
}

// ---------------------------------------------------------------------------
// SessionContext
// ---------------------------------------------------------------------------

struct Shared {
    host: String,
    credentials: Credentials,
    login: Option<LoginResult>,
}

/// The lock-guarded state every request reads.
///
/// Critical sections only copy values in or out; no network call is ever
/// made while the lock is held.
pub struct SessionContext {
    shared: Mutex<Shared>,
}

impl SessionContext {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            shared: Mutex::new(Shared {
                host: config.host,
                credentials: config.credentials,
                login: None,
            }),
        }
    }

    // A panic while holding the lock cannot leave the fields half-written:
    // every critical section is a plain read or a whole-value store.
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current controller authority.
    pub fn host(&self) -> String {
        self.lock().host.clone()
    }

    pub fn login_result(&self) -> Option<LoginResult> {
        self.lock().login.clone()
    }

    /// Replaces the credentials. The next login uses them; the current
    /// token stays valid until it goes stale.
    pub fn set_credentials(&self, credentials: Credentials) {
        self.lock().credentials = credentials;
    }

    /// Cached token (if any) and the host it belongs to.
    pub(crate) fn token_and_host(&self) -> (Option<String>, String) {
        let shared = self.lock();
        let token = shared
            .login
            .as_ref()
            .map(|login| login.csrf_token.clone())
            .filter(|token| !token.is_empty());
        (token, shared.host.clone())
    }

    /// Everything a login request needs, copied out in one critical section.
    pub(crate) fn login_snapshot(&self) -> (String, Credentials, Option<String>) {
        let shared = self.lock();
        (
            shared.host.clone(),
            shared.credentials.clone(),
            shared.login.as_ref().map(|login| login.csrf_token.clone()),
        )
    }

    pub(crate) fn store_login(&self, result: LoginResult) {
        self.lock().login = Some(result);
    }
}

impl RedirectObserver for SessionContext {
    fn redirected(&self, authority: &str) {
        let mut shared = self.lock();
        if shared.host != authority {
            tracing::info!(from = %shared.host, to = %authority, "controller host changed");
            shared.host = authority.to_string();
        }
    }
}

impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.lock();
        f.debug_struct("SessionContext")
            .field("host", &shared.host)
            .field("credentials", &shared.credentials)
            .field("logged_in", &shared.login.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> SessionContext {
        SessionContext::new(SessionConfig {
            host: "10.0.0.1".into(),
            credentials: Credentials::new("admin", "hunter22"),
        })
    }

    fn login(token: &str) -> LoginResult {
        LoginResult {
            privilege: Some("rw".into()),
            version: None,
            csrf_token: token.into(),
        }
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let debug = format!("{:?}", Credentials::new("admin", "hunter22"));
        assert!(debug.contains("admin"));
        assert!(!debug.contains("hunter22"), "password leaked: {debug}");
    }

    #[test]
    fn test_context_debug_redacts_password() {
        let debug = format!("{:?}", context());
        assert!(!debug.contains("hunter22"), "password leaked: {debug}");
    }

    #[test]
    fn test_redirected_to_new_host_updates_host() {
        let ctx = context();
        ctx.redirected("10.0.0.2:8443");
        assert_eq!(ctx.host(), "10.0.0.2:8443");
    }

    #[test]
    fn test_redirected_to_same_host_keeps_host() {
        let ctx = context();
        ctx.redirected("10.0.0.1");
        assert_eq!(ctx.host(), "10.0.0.1");
    }

    #[test]
    fn test_token_and_host_without_login_has_no_token() {
        let (token, host) = context().token_and_host();
        assert_eq!(token, None);
        assert_eq!(host, "10.0.0.1");
    }

    #[test]
    fn test_store_login_replaces_previous_result() {
        let ctx = context();
        ctx.store_login(login("first"));
        ctx.store_login(LoginResult { privilege: None, ..login("second") });

        let stored = ctx.login_result().unwrap();
        assert_eq!(stored.csrf_token, "second");
        assert_eq!(stored.privilege, None, "no field survives from the old result");
    }

    #[test]
    fn test_empty_token_is_not_cached() {
        let ctx = context();
        ctx.store_login(login(""));
        assert_eq!(ctx.token_and_host().0, None);
    }

    #[test]
    fn test_set_credentials_feeds_next_login_snapshot() {
        let ctx = context();
        ctx.set_credentials(Credentials::new("ops", "s3cret!!"));
        let (_, credentials, _) = ctx.login_snapshot();
        assert_eq!(credentials.username, "ops");
    }
}
