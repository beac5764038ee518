use async_trait::async_trait;

use cascata_types::{CascataError, OutcomeCode, PlacementConfig, RequestParams, WaterfallPlan};

/// Issues the ad request that yields a cycle's waterfall plan.
#[async_trait]
pub trait AdRequester: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str {
        "requester"
    }

    /// Request a waterfall plan for `placement` using the cycle's attributes.
    ///
    /// # Errors
    /// Returns `Transport` when the call fails and `MalformedResponse` when the
    /// response cannot be turned into a plan.
    async fn request(
        &self,
        placement: &PlacementConfig,
        params: &RequestParams,
    ) -> Result<WaterfallPlan, CascataError>;
}

/// What the tracking endpoint answered to an outcome report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportReceipt {
    /// Fully resolved URL that was requested.
    pub url: String,
    /// HTTP status code (or an equivalent for non-HTTP reporters).
    pub status: u16,
    /// Response body, possibly empty.
    pub body: String,
}

/// Files outcome reports against tracking URLs.
#[async_trait]
pub trait OutcomeReporter: Send + Sync {
    /// Report `code` against `template`.
    ///
    /// See [`outcome_url`](crate::report_url::outcome_url) for how the code is
    /// placed into the URL.
    ///
    /// # Errors
    /// Returns `Report` if the URL is invalid, the call fails, or the endpoint
    /// answers with a non-success status.
    async fn report(&self, template: &str, code: OutcomeCode)
    -> Result<ReportReceipt, CascataError>;
}
