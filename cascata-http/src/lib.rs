//! cascata-http
//!
//! reqwest-backed transports for cascata placements: an [`AdRequester`] that
//! fetches waterfall plans from an ad server and an [`OutcomeReporter`] that
//! files outcome reports against tracking URLs.
#![warn(missing_docs)]

/// GET abstraction and the production fetcher backed by `reqwest`.
pub mod adapter;
mod builder;

use std::sync::Arc;

use async_trait::async_trait;
use cascata_core::{
    AdRequester, CascataError, OutcomeCode, OutcomeReporter, PlacementConfig, ReportReceipt,
    RequestParams, WaterfallPlan, outcome_url, parse_plan,
};
use url::Url;

use adapter::HttpFetch;
pub use builder::{HttpTransport, HttpTransportBuilder};

/// Name reported by the requester in logs.
pub const NAME: &str = "cascata-http";

/// Build the ad-request URL: `<base>?id=<placement>&size=<w>x<h>&<attributes...>`.
///
/// Query parameters already present on `base` are kept in front.
#[must_use]
pub fn request_url(base: &Url, placement: &PlacementConfig, params: &RequestParams) -> Url {
    let mut url = base.clone();
    {
        let mut q = url.query_pairs_mut();
        q.append_pair("id", &placement.placement_id);
        if let Some(size) = placement.size_label() {
            q.append_pair("size", &size);
        }
        for (k, v) in params.query_pairs() {
            q.append_pair(k, &v);
        }
    }
    url
}

/// Fetches waterfall plans over HTTP.
pub struct HttpAdRequester {
    base: Url,
    fetch: Arc<dyn HttpFetch>,
}

impl std::fmt::Debug for HttpAdRequester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAdRequester")
            .field("base", &self.base.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpAdRequester {
    /// Requester against `base` using `fetch`.
    #[must_use]
    pub fn new(base: Url, fetch: Arc<dyn HttpFetch>) -> Self {
        Self { base, fetch }
    }

    /// Base URL requests are built on.
    #[must_use]
    pub const fn base(&self) -> &Url {
        &self.base
    }
}

#[async_trait]
impl AdRequester for HttpAdRequester {
    fn name(&self) -> &'static str {
        NAME
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "cascata_http::request",
            skip(self, placement, params),
            fields(placement = %placement.placement_id),
        )
    )]
    async fn request(
        &self,
        placement: &PlacementConfig,
        params: &RequestParams,
    ) -> Result<WaterfallPlan, CascataError> {
        let url = request_url(&self.base, placement, params);
        let resp = self.fetch.get(&url).await?;
        if !resp.is_success() {
            #[cfg(feature = "tracing")]
            tracing::warn!(status = resp.status, "ad server answered with an error status");
            return Err(CascataError::transport(format!(
                "ad server answered HTTP {}",
                resp.status
            )));
        }
        parse_plan(&resp.body)
    }
}

/// Files outcome reports with plain GETs.
pub struct HttpOutcomeReporter {
    fetch: Arc<dyn HttpFetch>,
}

impl std::fmt::Debug for HttpOutcomeReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpOutcomeReporter").finish_non_exhaustive()
    }
}

impl HttpOutcomeReporter {
    /// Reporter using `fetch`.
    #[must_use]
    pub fn new(fetch: Arc<dyn HttpFetch>) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl OutcomeReporter for HttpOutcomeReporter {
    async fn report(
        &self,
        template: &str,
        code: OutcomeCode,
    ) -> Result<ReportReceipt, CascataError> {
        let resolved = outcome_url(template, code)?;
        let url = Url::parse(&resolved).map_err(|e| CascataError::report(&resolved, e.to_string()))?;
        let resp = self
            .fetch
            .get(&url)
            .await
            .map_err(|e| CascataError::report(&resolved, e.to_string()))?;
        if !resp.is_success() {
            return Err(CascataError::report(
                resolved,
                format!("HTTP {}", resp.status),
            ));
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(url = %resolved, status = resp.status, "outcome report accepted");
        Ok(ReportReceipt {
            url: resolved,
            status: resp.status,
            body: resp.body,
        })
    }
}
