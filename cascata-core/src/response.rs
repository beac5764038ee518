//! JSON body of an ad-request response.

use serde::{Deserialize, Serialize};

use cascata_types::{AdSource, CascataError, WaterfallPlan};

/// Status string of a successful response.
pub const STATUS_OK: &str = "ok";

/// Envelope returned by the ad server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdResponse {
    /// `"ok"` on success; anything else is an error.
    pub status: String,
    /// Ordered candidate sources. Missing means no fill.
    #[serde(default)]
    pub waterfall: Vec<AdSource>,
    /// Server-side error description, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AdResponse {
    /// Successful response carrying `plan`.
    #[must_use]
    pub fn ok(plan: WaterfallPlan) -> Self {
        Self {
            status: STATUS_OK.to_string(),
            waterfall: plan.into_sources(),
            error: None,
        }
    }

    /// Serialize to the wire format.
    ///
    /// # Errors
    /// Returns `Other` if serialization fails.
    pub fn to_json(&self) -> Result<String, CascataError> {
        serde_json::to_string(self).map_err(|e| CascataError::Other(e.to_string()))
    }
}

/// Parse an ad-request response body into a plan.
///
/// # Errors
/// Returns `MalformedResponse` if the body is not valid JSON, does not match
/// the envelope, or carries a status other than `"ok"`.
pub fn parse_plan(body: &str) -> Result<WaterfallPlan, CascataError> {
    let resp: AdResponse =
        serde_json::from_str(body).map_err(|e| CascataError::malformed(e.to_string()))?;
    if resp.status != STATUS_OK {
        let detail = resp.error.unwrap_or_default();
        return Err(CascataError::malformed(format!(
            "status {:?} {detail}",
            resp.status
        )));
    }
    Ok(WaterfallPlan::new(resp.waterfall))
}

/// Parse the body of an outcome-report response as a replacement plan.
///
/// Only a well-formed, successful, non-empty plan counts; anything else means
/// "no override".
#[must_use]
pub fn parse_override(body: &str) -> Option<WaterfallPlan> {
    if body.trim().is_empty() {
        return None;
    }
    parse_plan(body).ok().filter(|plan| !plan.is_empty())
}
