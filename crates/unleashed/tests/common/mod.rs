//! In-process mock controller shared by the integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use unleashed::{Client, Credentials, Scheme};

pub const LANDING_PAGE: &str = r#"<!DOCTYPE html><html><head>
<script type="text/javascript">
  var privilege = "rw";
  var frameVersion = "200.15.6.12.304";
  var csfrToken = 'mock-token';
</script></head><body></body></html>"#;

/// Answers an envelope POST given the path and the request body.
pub type Responder = Arc<dyn Fn(&str, &str) -> (StatusCode, String) + Send + Sync>;

/// An envelope the controller received.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub csrf_token: Option<String>,
    pub body: String,
}

#[derive(Clone)]
pub struct MockController {
    logins: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<Recorded>>>,
    responder: Responder,
}

impl MockController {
    pub fn new(
        responder: impl Fn(&str, &str) -> (StatusCode, String) + Send + Sync + 'static,
    ) -> Self {
        Self {
            logins: Arc::default(),
            requests: Arc::default(),
            responder: Arc::new(responder),
        }
    }

    /// Answers every envelope with `body` and a 200.
    pub fn replying(body: &'static str) -> Self {
        Self::new(move |_, _| (StatusCode::OK, body.to_string()))
    }

    pub fn logins(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/admin/login.jsp", post(login))
            .route("/admin/_conf.jsp", post(envelope))
            .route("/admin/_cmdstat.jsp", post(envelope))
            .route("/admin/blob", get(blob))
            .route("/expire", get(expire))
            .with_state(self.clone())
    }

    pub async fn spawn(&self) -> SocketAddr {
        spawn(self.router()).await
    }
}

async fn login(State(mock): State<MockController>) -> impl IntoResponse {
    mock.logins.fetch_add(1, Ordering::SeqCst);
    ([(SET_COOKIE, "-ejs-session-=mock; Path=/")], LANDING_PAGE)
}

async fn envelope(
    State(mock): State<MockController>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let csrf_token = headers
        .get("x-csrf-token")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    mock.requests.lock().unwrap().push(Recorded {
        path: uri.path().to_string(),
        csrf_token,
        body: body.clone(),
    });
    (mock.responder)(uri.path(), &body)
}

async fn blob() -> String {
    "x".repeat(4096)
}

async fn expire() -> impl IntoResponse {
    ([(SET_COOKIE, "-ejs-session-=; Path=/; Max-Age=0")], "bye")
}

// -- Helpers --

pub async fn spawn(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// A plain-HTTP client for the controller at `addr`.
pub fn client(addr: SocketAddr) -> Client {
    Client::builder()
        .host(addr.to_string())
        .credentials(Credentials::new("admin", "secret-pass"))
        .scheme(Scheme::Http)
        .build()
        .unwrap()
}

/// Wraps `inner` in a configuration response envelope.
pub fn conf_response(inner: &str) -> String {
    format!(r#"<ajax-response><response type="object" id="mock">{inner}</response></ajax-response>"#)
}

/// Shows client logs when `RUST_LOG` is set.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
