use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::outcome::OutcomeCode;

/// Unified error type for the cascata workspace.
///
/// Covers ad-request transport failures, adapter resolution and construction
/// problems, explicit no-fill, timeouts, rendering failures of standard entries,
/// and the aggregate "waterfall exhausted" condition surfaced to placement owners.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CascataError {
    /// The ad-request call itself failed (connection error, non-2xx status).
    #[error("ad request transport failed: {msg}")]
    Transport {
        /// Human-readable error message.
        msg: String,
    },

    /// The ad-request response could not be parsed into a waterfall plan.
    #[error("malformed ad response: {0}")]
    MalformedResponse(String),

    /// The ad-request call exceeded the configured request timeout.
    #[error("ad request timed out after {timeout_ms}ms")]
    RequestTimeout {
        /// Configured timeout in milliseconds.
        timeout_ms: u64,
    },

    /// No adapter is registered under the requested identifier.
    #[error("mediation adapter not found: {adapter}")]
    AdapterNotFound {
        /// Adapter identifier carried by the waterfall entry.
        adapter: String,
    },

    /// The adapter is registered but does not provide the required capability.
    #[error("mediation adapter {adapter} lacks capability: {capability}")]
    MissingCapability {
        /// Adapter identifier carried by the waterfall entry.
        adapter: String,
        /// Capability label (e.g. "banner").
        capability: String,
    },

    /// The adapter failed while being constructed or while issuing its request.
    #[error("mediation adapter {adapter} failed to construct: {msg}")]
    AdapterConstruction {
        /// Adapter identifier carried by the waterfall entry.
        adapter: String,
        /// Human-readable error message.
        msg: String,
    },

    /// The adapter panicked while issuing its request.
    #[error("mediation adapter {adapter} panicked")]
    AdapterPanicked {
        /// Adapter identifier carried by the waterfall entry.
        adapter: String,
    },

    /// The source explicitly reported that it has no inventory.
    #[error("no fill: {source_label}")]
    NoFill {
        /// Adapter identifier or "standard".
        source_label: String,
    },

    /// The adapter neither loaded nor failed within the mediation timeout.
    #[error("mediation attempt via {adapter} timed out after {timeout_ms}ms")]
    AttemptTimeout {
        /// Adapter identifier carried by the waterfall entry.
        adapter: String,
        /// Configured mediation timeout in milliseconds.
        timeout_ms: u64,
    },

    /// A standard entry could not be rendered into a displayable surface.
    #[error("render failed: {0}")]
    Render(String),

    /// An outcome report call failed. Logged only; never surfaced to owners.
    #[error("outcome report to {url} failed: {msg}")]
    Report {
        /// Fully resolved report URL.
        url: String,
        /// Human-readable error message.
        msg: String,
    },

    /// Request parameters could not be assembled for a firing.
    #[error("identity unavailable: {0}")]
    Identity(String),

    /// Every waterfall entry was tried and none produced an ad.
    #[error("waterfall exhausted after {attempted} attempt(s)")]
    Exhausted {
        /// Number of entries attempted in the cycle.
        attempted: usize,
    },

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),

    /// The cycle was cancelled by the scheduler.
    #[error("cycle cancelled")]
    Cancelled,

    /// Unknown/opaque error.
    #[error("unknown error: {0}")]
    Other(String),
}

impl CascataError {
    /// Helper: build a `Transport` error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport { msg: msg.into() }
    }

    /// Helper: build a `MalformedResponse` error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Helper: build an `AdapterNotFound` error.
    pub fn adapter_not_found(adapter: impl Into<String>) -> Self {
        Self::AdapterNotFound {
            adapter: adapter.into(),
        }
    }

    /// Helper: build a `MissingCapability` error.
    pub fn missing_capability(adapter: impl Into<String>, capability: impl Into<String>) -> Self {
        Self::MissingCapability {
            adapter: adapter.into(),
            capability: capability.into(),
        }
    }

    /// Helper: build an `AdapterConstruction` error.
    pub fn construction(adapter: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::AdapterConstruction {
            adapter: adapter.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `NoFill` error.
    pub fn no_fill(source_label: impl Into<String>) -> Self {
        Self::NoFill {
            source_label: source_label.into(),
        }
    }

    /// Helper: build a `Report` error.
    pub fn report(url: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Report {
            url: url.into(),
            msg: msg.into(),
        }
    }

    /// Outcome code recorded for an attempt (or cycle) that ended with this error.
    ///
    /// Adapter resolution and construction problems map to
    /// `MediatedSdkUnavailable`, explicit no-fill maps to `UnableToFill`, and
    /// everything else (timeouts, transport, rendering) maps to `InternalError`.
    #[must_use]
    pub const fn outcome(&self) -> OutcomeCode {
        match self {
            Self::AdapterNotFound { .. }
            | Self::MissingCapability { .. }
            | Self::AdapterConstruction { .. }
            | Self::AdapterPanicked { .. } => OutcomeCode::MediatedSdkUnavailable,
            Self::NoFill { .. } | Self::Exhausted { .. } => OutcomeCode::UnableToFill,
            _ => OutcomeCode::InternalError,
        }
    }

    /// Returns true if this error ends a whole cycle rather than a single attempt.
    #[must_use]
    pub const fn is_cycle_level(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::MalformedResponse(_) | Self::RequestTimeout { .. }
        )
    }
}
