use std::fmt;

use crate::signal::AttemptSignal;
use cascata_types::{CascataError, RequestParams};

/// A rendered, attachable ad surface.
///
/// Produced either by a [`StandardRenderer`](crate::render::StandardRenderer) for
/// standard entries or by a [`BannerAdapter`] for mediated ones.
pub trait Displayable: Send + Sync + fmt::Debug {
    /// Width of the surface in density-independent pixels.
    fn width(&self) -> u32;

    /// Height of the surface in density-independent pixels.
    fn height(&self) -> u32;

    /// Whether the surface can actually be shown.
    ///
    /// A surface that reports `false` is treated as if the source had no fill.
    fn is_usable(&self) -> bool {
        true
    }

    /// Release any resources held by the surface once it is no longer shown.
    fn detach(&self) {}
}

/// Arguments handed to an adapter for one mediated attempt.
#[derive(Debug, Clone, Copy)]
pub struct MediatedRequest<'a> {
    /// Placement the attempt belongs to.
    pub placement_id: &'a str,
    /// Opaque parameter blob from the waterfall entry.
    pub params: Option<&'a str>,
    /// Numeric identifier from the waterfall entry.
    pub id: u64,
    /// Requested width.
    pub width: u32,
    /// Requested height.
    pub height: u32,
    /// Device and user attributes of the cycle.
    pub request: &'a RequestParams,
}

/// Focused role trait for mediation networks that can serve banner ads.
pub trait BannerAdapter: Send + Sync {
    /// Start a banner request.
    ///
    /// The adapter reports its terminal result through `signal`, either before
    /// returning or later from any task or thread. Returning `Err` means the
    /// adapter could not even be set up; the attempt is then classified without
    /// waiting for the signal.
    ///
    /// # Errors
    /// Returns an error if the adapter cannot be constructed for this request.
    fn request_ad(
        &self,
        req: &MediatedRequest<'_>,
        signal: AttemptSignal,
    ) -> Result<(), CascataError>;
}

/// Registry entry for a third-party ad network.
///
/// Capabilities are discovered at runtime through the `as_*` accessors, which
/// return `None` unless the network overrides them.
pub trait MediationNetwork: Send + Sync {
    /// Adapter identifier this network is registered under.
    fn name(&self) -> &'static str;

    /// Vendor name for diagnostics.
    fn vendor(&self) -> &'static str {
        "unknown"
    }

    /// Banner capability, if supported.
    fn as_banner_adapter(&self) -> Option<&dyn BannerAdapter> {
        None
    }
}
