//! `reqwest`-backed transport with a cookie jar and host-tracking redirects.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::{Attempt, Policy};
use url::Url;

use crate::{
    CSRF_HEADER, HttpRequest, HttpResponse, Method, RedirectObserver, Scheme,
    Transport, TransportConfig, TransportError,
};

/// Marker error handed to reqwest when the redirect bound is hit, so it can
/// be told apart from other redirect failures on the way back out.
#[derive(Debug)]
struct RedirectLimitExceeded(usize);

impl fmt::Display for RedirectLimitExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stopped after {} redirects", self.0)
    }
}

impl StdError for RedirectLimitExceeded {}

/// An HTTP(S) [`Transport`] with its own cookie jar.
///
/// Every redirect hop is reported to the [`RedirectObserver`] before it is
/// followed, and chains longer than `max_redirects` fail.
pub struct HttpTransport {
    client: reqwest::Client,
    jar: Arc<Jar>,
    config: TransportConfig,
}

impl HttpTransport {
    /// Builds the transport.
    ///
    /// # Errors
    /// Returns [`TransportError::Http`] if the TLS backend cannot be
    /// initialised.
    pub fn new(
        config: TransportConfig,
        observer: Arc<dyn RedirectObserver>,
    ) -> Result<Self, TransportError> {
        let jar = Arc::new(Jar::default());
        let max_redirects = config.max_redirects;

        let policy = Policy::custom(move |attempt: Attempt<'_>| {
            // `previous()` includes the original request, so hop N sees N
            // entries.
            if attempt.previous().len() > max_redirects {
                tracing::warn!(
                    target = %attempt.url(),
                    max_redirects,
                    "redirect limit reached"
                );
                return attempt.error(RedirectLimitExceeded(max_redirects));
            }
            if let Some(authority) = crate::authority(attempt.url()) {
                observer.redirected(&authority);
            }
            attempt.follow()
        });

        let client = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .redirect(policy)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(TransportError::Http)?;

        Ok(Self { client, jar, config })
    }

    /// Returns the configuration this transport was built with.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn classify(&self, err: reqwest::Error) -> TransportError {
        let mut source = err.source();
        while let Some(inner) = source {
            if let Some(limit) = inner.downcast_ref::<RedirectLimitExceeded>() {
                return TransportError::RedirectLimit { limit: limit.0 };
            }
            source = inner.source();
        }
        TransportError::Http(err)
    }
}

impl Transport for HttpTransport {
    async fn send(
        &self,
        request: HttpRequest,
    ) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };
        tracing::debug!(method = %method, url = %request.url, "sending request");

        let mut builder = self.client.request(method, request.url);
        if let Some(token) = &request.csrf_token {
            builder = builder.header(CSRF_HEADER, token);
        }
        if let Some(content_type) = request.content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        if request.method == Method::Post {
            builder = builder.body(request.body);
        }

        let response = builder.send().await.map_err(|e| self.classify(e))?;
        let status = response.status().as_u16();
        let url = response.url().clone();
        tracing::debug!(status, url = %url, "response received");

        // The configured limit is a ceiling; requests may only lower it.
        let limit = request.body_limit.min(self.config.body_limit);
        let body = read_capped(response, limit).await?;
        Ok(HttpResponse { status, url, body })
    }

    fn has_cookies(&self, url: &Url) -> bool {
        self.jar.cookies(url).is_some()
    }

    fn scheme(&self) -> Scheme {
        self.config.scheme
    }
}

/// Reads the body chunk by chunk, failing as soon as `limit` is crossed.
async fn read_capped(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, TransportError> {
    if let Some(declared) = response.content_length() {
        if declared > limit as u64 {
            return Err(TransportError::BodyTooLarge { limit });
        }
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(TransportError::Http)? {
        if body.len() + chunk.len() > limit {
            return Err(TransportError::BodyTooLarge { limit });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}
