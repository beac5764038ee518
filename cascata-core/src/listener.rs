use std::sync::Arc;

use crate::adapter::Displayable;
use cascata_types::{CascataError, SourceKind};

/// The ad a cycle settled on.
#[derive(Debug, Clone)]
pub struct LoadedAd {
    /// Surface to attach.
    pub surface: Arc<dyn Displayable>,
    /// Index of the winning entry within the plan being traversed.
    pub index: usize,
    /// Kind of the winning entry.
    pub kind: SourceKind,
    /// Adapter id or `"standard"`.
    pub label: String,
}

/// Receives the final result of every completed cycle.
///
/// Exactly one of the two methods is called per cycle that runs to completion.
/// Cancelled cycles call neither.
pub trait PlacementListener: Send + Sync {
    /// An entry produced an ad.
    fn on_ad_loaded(&self, ad: &LoadedAd);

    /// The request failed or every entry came back empty.
    fn on_ad_request_failed(&self, cause: &CascataError);
}

/// Listener that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopListener;

impl PlacementListener for NoopListener {
    fn on_ad_loaded(&self, _ad: &LoadedAd) {}

    fn on_ad_request_failed(&self, _cause: &CascataError) {}
}
