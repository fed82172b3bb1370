//! Integration tests for the reqwest-backed transport.
//!
//! Each test binds throwaway axum servers on `127.0.0.1:0` so real HTTP
//! flows through the cookie jar, the redirect policy and the body cap.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::http::HeaderMap;
use axum::http::header::SET_COOKIE;
use axum::response::Redirect;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use unleashed_transport::{
    HttpRequest, HttpTransport, RedirectObserver, Scheme, Transport,
    TransportConfig, TransportError, endpoint,
};

// -- Helpers ----------------------------------------------------------

/// Records every authority the transport reports.
#[derive(Default)]
struct Recorder(Mutex<Vec<String>>);

impl RedirectObserver for Recorder {
    fn redirected(&self, authority: &str) {
        self.0.lock().unwrap().push(authority.to_string());
    }
}

fn plain_http() -> TransportConfig {
    TransportConfig {
        scheme: Scheme::Http,
        ..TransportConfig::default()
    }
}

async fn serve(listener: TcpListener, app: Router) {
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
}

async fn spawn(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    serve(listener, app).await;
    addr
}

/// Binds `count` listeners where each `/hop` redirects to the next one.
/// The last listener answers "done".
async fn spawn_redirect_chain(count: usize) -> Vec<SocketAddr> {
    let mut listeners = Vec::new();
    for _ in 0..count {
        listeners.push(TcpListener::bind("127.0.0.1:0").await.unwrap());
    }
    let addrs: Vec<SocketAddr> =
        listeners.iter().map(|l| l.local_addr().unwrap()).collect();

    for (i, listener) in listeners.into_iter().enumerate() {
        let app = match addrs.get(i + 1) {
            Some(next) => {
                let target = format!("http://{next}/hop");
                Router::new().route(
                    "/hop",
                    get(move || async move { Redirect::temporary(&target) }),
                )
            }
            None => Router::new().route("/hop", get(|| async { "done" })),
        };
        serve(listener, app).await;
    }
    addrs
}

fn transport(config: TransportConfig) -> (HttpTransport, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let transport = HttpTransport::new(config, recorder.clone())
        .expect("transport should build");
    (transport, recorder)
}

// =====================================================================
// Cookies
// =====================================================================

#[tokio::test]
async fn test_send_stores_cookie_for_host() {
    let app = Router::new().route(
        "/admin/login.jsp",
        post(|| async { ([(SET_COOKIE, "-ejs-session-=x1; Path=/")], "ok") }),
    );
    let addr = spawn(app).await;
    let (transport, _) = transport(plain_http());
    let url = endpoint(Scheme::Http, &addr.to_string(), "/admin/login.jsp")
        .unwrap();
    let root = endpoint(Scheme::Http, &addr.to_string(), "/").unwrap();

    assert!(!transport.has_cookies(&root));

    let response = transport
        .send(HttpRequest::post(url, b"username=a".to_vec()))
        .await
        .expect("send should succeed");

    assert!(response.is_ok());
    assert!(transport.has_cookies(&root), "cookie should be stored");
}

#[tokio::test]
async fn test_send_expired_cookie_clears_jar() {
    let app = Router::new()
        .route(
            "/set",
            get(|| async { ([(SET_COOKIE, "sid=1; Path=/")], "set") }),
        )
        .route(
            "/expire",
            get(|| async { ([(SET_COOKIE, "sid=; Path=/; Max-Age=0")], "gone") }),
        );
    let addr = spawn(app).await;
    let (transport, _) = transport(plain_http());
    let host = addr.to_string();
    let root = endpoint(Scheme::Http, &host, "/").unwrap();

    transport
        .send(HttpRequest::get(endpoint(Scheme::Http, &host, "/set").unwrap()))
        .await
        .unwrap();
    assert!(transport.has_cookies(&root));

    transport
        .send(HttpRequest::get(endpoint(Scheme::Http, &host, "/expire").unwrap()))
        .await
        .unwrap();
    assert!(!transport.has_cookies(&root), "cookie should be expired");
}

// =====================================================================
// Headers
// =====================================================================

#[tokio::test]
async fn test_send_post_carries_csrf_and_form_content_type() {
    let app = Router::new().route(
        "/echo",
        post(|headers: HeaderMap| async move {
            let token = headers
                .get("x-csrf-token")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            let content_type = headers
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            format!("{token}|{content_type}")
        }),
    );
    let addr = spawn(app).await;
    let (transport, _) = transport(plain_http());
    let url = endpoint(Scheme::Http, &addr.to_string(), "/echo").unwrap();

    let response = transport
        .send(HttpRequest::post(url, b"<ajax-request/>".to_vec()).csrf_token("tok"))
        .await
        .unwrap();

    assert_eq!(
        String::from_utf8(response.body).unwrap(),
        "tok|application/x-www-form-urlencoded"
    );
}

// =====================================================================
// Body limit
// =====================================================================

#[tokio::test]
async fn test_send_body_over_limit_returns_error() {
    let app = Router::new().route("/big", get(|| async { "x".repeat(4096) }));
    let addr = spawn(app).await;
    let (transport, _) = transport(plain_http());
    let url = endpoint(Scheme::Http, &addr.to_string(), "/big").unwrap();

    let result = transport.send(HttpRequest::get(url).body_limit(1024)).await;

    assert!(
        matches!(result, Err(TransportError::BodyTooLarge { limit: 1024 })),
        "oversized body should be rejected"
    );
}

#[tokio::test]
async fn test_send_body_within_limit_is_returned() {
    let app = Router::new().route("/small", get(|| async { "x".repeat(512) }));
    let addr = spawn(app).await;
    let (transport, _) = transport(plain_http());
    let url = endpoint(Scheme::Http, &addr.to_string(), "/small").unwrap();

    let response = transport
        .send(HttpRequest::get(url).body_limit(1024))
        .await
        .expect("should fit");

    assert_eq!(response.body.len(), 512);
}

#[tokio::test]
async fn test_send_config_limit_caps_larger_request_limit() {
    let app = Router::new().route("/big", get(|| async { "x".repeat(4096) }));
    let addr = spawn(app).await;
    let (transport, _) = transport(TransportConfig {
        body_limit: 2048,
        ..plain_http()
    });
    let url = endpoint(Scheme::Http, &addr.to_string(), "/big").unwrap();

    let result = transport.send(HttpRequest::get(url)).await;

    assert!(
        matches!(result, Err(TransportError::BodyTooLarge { limit: 2048 })),
        "configured limit should apply"
    );
}

// =====================================================================
// Redirects
// =====================================================================

#[tokio::test]
async fn test_send_reports_each_redirect_hop() {
    let addrs = spawn_redirect_chain(3).await;
    let (transport, recorder) = transport(plain_http());
    let url = endpoint(Scheme::Http, &addrs[0].to_string(), "/hop").unwrap();

    let response = transport.send(HttpRequest::get(url)).await.unwrap();

    assert_eq!(response.body, b"done");
    assert_eq!(response.url.port(), Some(addrs[2].port()));
    let seen = recorder.0.lock().unwrap().clone();
    assert_eq!(seen, vec![addrs[1].to_string(), addrs[2].to_string()]);
}

#[tokio::test]
async fn test_send_redirect_chain_over_limit_returns_redirect_limit() {
    // 12 servers = 11 hops, one more than the default bound.
    let addrs = spawn_redirect_chain(12).await;
    let (transport, recorder) = transport(plain_http());
    let url = endpoint(Scheme::Http, &addrs[0].to_string(), "/hop").unwrap();

    let result = transport.send(HttpRequest::get(url)).await;

    assert!(
        matches!(result, Err(TransportError::RedirectLimit { limit: 10 })),
        "expected redirect limit, got {result:?}"
    );
    // The 11th hop was refused before being reported or followed.
    assert_eq!(recorder.0.lock().unwrap().len(), 10);
}

#[tokio::test]
async fn test_send_redirect_chain_at_limit_succeeds() {
    // 11 servers = exactly 10 hops.
    let addrs = spawn_redirect_chain(11).await;
    let (transport, _) = transport(plain_http());
    let url = endpoint(Scheme::Http, &addrs[0].to_string(), "/hop").unwrap();

    let response = transport.send(HttpRequest::get(url)).await;

    assert!(response.is_ok(), "10 hops should be followed");
}
