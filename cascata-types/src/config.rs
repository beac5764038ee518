//! Configuration types threaded into placements and schedulers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default refresh period between scheduled ad requests.
pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_millis(60_000);
/// Default bound on a single mediated adapter invocation.
pub const DEFAULT_MEDIATION_TIMEOUT: Duration = Duration::from_millis(15_000);
/// Default bound on the ad-request network call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(10_000);

/// What to do when a standard waterfall entry fails to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum StandardFailurePolicy {
    /// Treat the failure as this entry's failure and continue with the next entry.
    #[default]
    Advance,
    /// End the cycle as a no-fill without trying the remaining entries.
    Terminate,
}

/// Configuration for one placement's refresh loop and waterfall traversal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// Placement identifier sent with every ad request.
    pub placement_id: String,
    /// Requested ad width, if fixed.
    pub width: Option<u32>,
    /// Requested ad height, if fixed.
    pub height: Option<u32>,
    /// Interval between scheduled fires. Zero means fire once and stay idle.
    pub refresh_period: Duration,
    /// Bound on each mediated adapter invocation.
    pub mediation_timeout: Duration,
    /// Bound on the ad-request call.
    pub request_timeout: Duration,
    /// Handling of standard entries that fail to render.
    pub standard_failure: StandardFailurePolicy,
    /// Await outcome reports of failed mediated entries and let a plan carried in
    /// the report response replace the rest of the waterfall.
    pub follow_report_overrides: bool,
}

impl PlacementConfig {
    /// Configuration with defaults for the given placement id.
    pub fn new(placement_id: impl Into<String>) -> Self {
        Self {
            placement_id: placement_id.into(),
            ..Self::default()
        }
    }

    /// `"<w>x<h>"` when both dimensions are set.
    #[must_use]
    pub fn size_label(&self) -> Option<String> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(format!("{w}x{h}")),
            _ => None,
        }
    }
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            placement_id: String::new(),
            width: None,
            height: None,
            refresh_period: DEFAULT_REFRESH_PERIOD,
            mediation_timeout: DEFAULT_MEDIATION_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            standard_failure: StandardFailurePolicy::default(),
            follow_report_overrides: false,
        }
    }
}
