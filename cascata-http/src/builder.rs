use std::sync::Arc;
use std::time::Duration;

use cascata_core::CascataError;
use url::Url;

use crate::adapter::{DEFAULT_USER_AGENT, HttpFetch, RealFetcher};
use crate::{HttpAdRequester, HttpOutcomeReporter};

/// Default timeout applied by the underlying HTTP client.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// A requester and a reporter sharing one HTTP client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// Ad-request side.
    pub requester: Arc<HttpAdRequester>,
    /// Outcome-report side.
    pub reporter: Arc<HttpOutcomeReporter>,
}

/// Builder for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransportBuilder {
    base_url: Option<String>,
    timeout: Duration,
    user_agent: String,
    client: Option<reqwest::Client>,
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransportBuilder {
    /// Start with the default timeout and user agent and no base URL.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_HTTP_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            client: None,
        }
    }

    /// Ad-server endpoint the requester builds its URLs on.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Timeout of each HTTP call.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// User agent header value.
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }

    /// Use a preconfigured client; `timeout` and `user_agent` are then ignored.
    #[must_use]
    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Build the transport.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the base URL is missing or unparseable, the
    /// timeout is zero, or the HTTP client cannot be built.
    pub fn build(self) -> Result<HttpTransport, CascataError> {
        let raw = self.base_url.ok_or_else(|| {
            CascataError::InvalidArg("no base url configured; add one via base_url(...)".into())
        })?;
        let base = Url::parse(&raw)
            .map_err(|e| CascataError::InvalidArg(format!("base url {raw:?}: {e}")))?;
        let fetcher = match self.client {
            Some(client) => RealFetcher::new(client),
            None => {
                if self.timeout.is_zero() {
                    return Err(CascataError::InvalidArg(
                        "http timeout must be positive".into(),
                    ));
                }
                RealFetcher::with_settings(self.timeout, &self.user_agent)?
            }
        };
        let fetch: Arc<dyn HttpFetch> = Arc::new(fetcher);
        Ok(HttpTransport {
            requester: Arc::new(HttpAdRequester::new(base, Arc::clone(&fetch))),
            reporter: Arc::new(HttpOutcomeReporter::new(fetch)),
        })
    }
}
