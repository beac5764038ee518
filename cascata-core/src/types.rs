//! Re-export of the data model from `cascata-types`.
// Consolidated re-exports so downstream crates can depend on `cascata-core` only

pub use cascata_types::{AdapterId, CascataError, OutcomeCode};

pub use cascata_types::{
    DEFAULT_MEDIATION_TIMEOUT, DEFAULT_REFRESH_PERIOD, DEFAULT_REQUEST_TIMEOUT, PlacementConfig,
    StandardFailurePolicy,
};

pub use cascata_types::{AdSource, MediatedSource, SourceKind, StandardAd, WaterfallPlan};

pub use cascata_types::{GeoPoint, Orientation, RequestParams, RequestParamsBuilder};

pub use cascata_types::{AttemptRecord, CycleReport, CycleResolution, DispatchedReport};
