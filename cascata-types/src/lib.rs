//! Cascata data model, configuration primitives and the unified error type.
#![warn(missing_docs)]

mod config;
mod connector;
mod error;
mod outcome;
mod params;
mod reports;
mod source;

pub use config::{
    DEFAULT_MEDIATION_TIMEOUT, DEFAULT_REFRESH_PERIOD, DEFAULT_REQUEST_TIMEOUT, PlacementConfig,
    StandardFailurePolicy,
};
pub use connector::AdapterId;
pub use error::CascataError;
pub use outcome::OutcomeCode;
pub use params::{GeoPoint, Orientation, RequestParams, RequestParamsBuilder};
pub use reports::{AttemptRecord, CycleReport, CycleResolution, DispatchedReport};
pub use source::{AdSource, MediatedSource, SourceKind, StandardAd, WaterfallPlan};
