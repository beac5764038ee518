//! Cascata keeps an ad placement filled by periodically walking a mediation
//! waterfall.
//!
//! Overview
//! - A [`RefreshScheduler`] fires the placement immediately and then once per
//!   refresh period.
//! - Each fire runs one cycle: the [`AdRequester`] returns a [`WaterfallPlan`],
//!   whose entries are tried strictly in order, one at a time.
//! - Standard entries are rendered directly. Mediated entries are handed to the
//!   adapter registered under their identifier and given the mediation timeout
//!   to signal a result.
//! - Every mediated entry with a report URL gets exactly one outcome report,
//!   dispatched before the next entry starts.
//! - The first success ends the cycle with `on_ad_loaded`; running out of
//!   entries ends it with `on_ad_request_failed`.
//!
//! Key behaviors and trade-offs
//! - Outcome reports are fire-and-forget by default. With
//!   `follow_report_overrides` the controller waits (bounded by the mediation
//!   timeout) for each failed entry's report so a plan in the response can
//!   replace the rest of the waterfall; this adds latency per failed entry.
//! - Standard entries that fail to render advance the waterfall by default;
//!   `StandardFailurePolicy::Terminate` ends the cycle instead.
//! - A zero refresh period makes the scheduler single-shot.
//!
//! Example
//! ```rust,ignore
//! use std::sync::Arc;
//! use cascata::Placement;
//!
//! let placement = Placement::builder()
//!     .placement_id("home-banner")
//!     .size(320, 50)
//!     .requester(requester)
//!     .reporter(reporter)
//!     .with_network(Arc::new(MyNetwork::default()))
//!     .listener(Arc::new(MyOwner))
//!     .build()?;
//!
//! let mut scheduler = placement.scheduler();
//! scheduler.start().await;
//! // ...
//! scheduler.stop().await;
//! ```
#![warn(missing_docs)]

pub(crate) mod core;
mod report;
mod scheduler;
mod waterfall;

pub use core::{Placement, PlacementBuilder};
pub use scheduler::RefreshScheduler;

// Re-export core types for convenience
pub use cascata_core::{
    AdRequester, AdSource, AdapterFailure, AdapterId, AdapterRegistry, AttemptRecord,
    AttemptSignal, BannerAdapter, CancelToken, CascataError, CycleReport, CycleResolution,
    DispatchedReport, Displayable, GeoPoint, IdentityProvider, LoadedAd, MediatedRequest,
    MediatedSource, MediationNetwork, NoopListener, Orientation, OutcomeCode, OutcomeReporter,
    PlacementConfig, PlacementListener, ReportReceipt, RequestParams, RequestParamsBuilder,
    SourceKind, StandardAd, StandardFailurePolicy, StandardRenderer, StaticIdentity,
    WaterfallPlan,
};
