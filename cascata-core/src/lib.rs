//! cascata-core
//!
//! Collaborator traits and the plumbing shared by the cascata orchestrator and
//! its connectors.
//!
//! - `adapter`: the `MediationNetwork` registry entry, its `BannerAdapter`
//!   capability and the `Displayable` surface they produce.
//! - `signal`: the single-fire channel an adapter reports through.
//! - `registry`: lookup from adapter identifiers to networks.
//! - `transport`: the `AdRequester` and `OutcomeReporter` seams.
//! - `response` / `report_url`: wire format of ad responses and tracking URLs.
//!
//! Async runtime (Tokio)
//! ---------------------
//! `signal::AttemptSignal`, `cancel::CancelToken` and the `handle` schedule guard are
//! built on Tokio channels and `tokio::task::JoinHandle`, so callers must run
//! under a Tokio 1.x runtime.
//!
#![warn(missing_docs)]

/// Mediation network, banner capability and surface traits.
pub mod adapter;
/// Cooperative cancellation token.
pub mod cancel;
/// Ownership of a running schedule.
pub mod handle;
/// Identity providers that assemble request parameters.
pub mod identity;
/// Placement owner callbacks.
pub mod listener;
/// Adapter identifier lookup.
pub mod registry;
/// Renderer for standard inventory.
pub mod render;
/// Outcome code placement into tracking URLs.
pub mod report_url;
/// Ad-request response wire format.
pub mod response;
/// Single-fire attempt signalling.
pub mod signal;
/// Ad-request and outcome-report transports.
pub mod transport;
pub mod types;

pub use adapter::{BannerAdapter, Displayable, MediatedRequest, MediationNetwork};
pub use cancel::CancelToken;
pub use identity::{IdentityProvider, StaticIdentity};
pub use listener::{LoadedAd, NoopListener, PlacementListener};
pub use registry::AdapterRegistry;
pub use render::StandardRenderer;
pub use report_url::outcome_url;
pub use response::{AdResponse, parse_override, parse_plan};
pub use signal::{AdapterFailure, AdapterResult, AttemptSignal, SignalReceiver, attempt_channel};
pub use transport::{AdRequester, OutcomeReporter, ReportReceipt};
pub use types::*;
