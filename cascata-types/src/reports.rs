//! Report envelopes produced by a waterfall cycle.

use serde::{Deserialize, Serialize};

use crate::error::CascataError;
use crate::outcome::OutcomeCode;
use crate::source::SourceKind;

/// Classification of one attempted waterfall entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Position within the plan that was being traversed.
    pub index: usize,
    /// Kind of the entry.
    pub kind: SourceKind,
    /// Adapter id, or `"standard"`.
    pub label: String,
    /// Terminal classification.
    pub outcome: OutcomeCode,
    /// Whether an outcome report was dispatched for this entry.
    pub reported: bool,
}

/// An outcome report handed to the reporter, in dispatch order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchedReport {
    /// Position of the reported entry within its plan.
    pub index: usize,
    /// URL template the report was filed against.
    pub url: String,
    /// Outcome code substituted into the URL.
    pub code: OutcomeCode,
}

/// How a cycle ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CycleResolution {
    /// An entry produced a surface and the owner was told `on_ad_loaded`.
    Loaded {
        /// Index of the winning entry.
        index: usize,
    },
    /// Every entry failed; the owner was told `on_ad_request_failed`.
    NoFill,
    /// The ad request itself failed; no waterfall ran.
    RequestFailed(CascataError),
    /// The scheduler stopped the cycle; no owner callback fired.
    Cancelled,
}

/// Summary of one ad-request cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    /// Attempts in the order they were made.
    pub attempts: Vec<AttemptRecord>,
    /// Outcome reports in the order they were dispatched.
    pub dispatched: Vec<DispatchedReport>,
    /// Final resolution.
    pub resolution: CycleResolution,
}

impl CycleReport {
    /// Cycle-level outcome, or `None` when cancelled.
    #[must_use]
    pub const fn outcome(&self) -> Option<OutcomeCode> {
        match self.resolution {
            CycleResolution::Loaded { .. } => Some(OutcomeCode::Success),
            CycleResolution::NoFill => Some(OutcomeCode::UnableToFill),
            CycleResolution::RequestFailed(_) => Some(OutcomeCode::InternalError),
            CycleResolution::Cancelled => None,
        }
    }

    /// Outcome codes of the dispatched reports, in order.
    #[must_use]
    pub fn dispatched_codes(&self) -> Vec<OutcomeCode> {
        self.dispatched.iter().map(|r| r.code).collect()
    }
}
