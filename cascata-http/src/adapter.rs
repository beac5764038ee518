#[cfg(feature = "test-adapters")]
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cascata_core::CascataError;
use url::Url;

/// Default user agent sent by [`RealFetcher`].
pub const DEFAULT_USER_AGENT: &str = concat!("cascata-http/", env!("CARGO_PKG_VERSION"));

/// Status and body of a completed GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body decoded as text.
    pub body: String,
}

impl HttpResponse {
    /// Whether the status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// GET abstraction (so we can inject mocks in tests).
///
/// Implementations return `Transport` for anything that prevented a response
/// from arriving. Callers decide what a non-2xx status means.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    /// Issue a GET for `url` and read the whole body.
    async fn get(&self, url: &Url) -> Result<HttpResponse, CascataError>;
}

/// Production fetcher backed by a shared `reqwest::Client`.
#[derive(Clone, Debug)]
pub struct RealFetcher {
    client: reqwest::Client,
}

impl RealFetcher {
    /// Wrap an existing client.
    #[must_use]
    pub const fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Build a client with the given timeout and user agent.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the client cannot be constructed (for example an
    /// invalid user agent header value).
    pub fn with_settings(timeout: Duration, user_agent: &str) -> Result<Self, CascataError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| CascataError::InvalidArg(format!("http client: {e}")))?;
        Ok(Self::new(client))
    }
}

fn map_reqwest_err(e: &reqwest::Error, url: &Url) -> CascataError {
    if e.is_timeout() {
        CascataError::transport(format!("GET {url} timed out"))
    } else if e.is_connect() {
        CascataError::transport(format!("GET {url} could not connect: {e}"))
    } else {
        CascataError::transport(format!("GET {url} failed: {e}"))
    }
}

#[async_trait]
impl HttpFetch for RealFetcher {
    async fn get(&self, url: &Url) -> Result<HttpResponse, CascataError> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| map_reqwest_err(&e, url))?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(|e| map_reqwest_err(&e, url))?;
        Ok(HttpResponse { status, body })
    }
}

/* -------- Test-only lightweight adapter constructors ------- */

#[cfg(feature = "test-adapters")]
impl dyn HttpFetch {
    /// Build an `HttpFetch` from a closure receiving the requested URL (tests only).
    pub fn from_fn<F>(f: F) -> Arc<dyn HttpFetch>
    where
        F: Send + Sync + 'static + Fn(Url) -> Result<HttpResponse, CascataError>,
    {
        struct FnFetch<F>(F);
        #[async_trait]
        impl<F> HttpFetch for FnFetch<F>
        where
            F: Send + Sync + 'static + Fn(Url) -> Result<HttpResponse, CascataError>,
        {
            async fn get(&self, url: &Url) -> Result<HttpResponse, CascataError> {
                (self.0)(url.clone())
            }
        }
        Arc::new(FnFetch(f))
    }
}
