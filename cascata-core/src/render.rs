use std::sync::Arc;

use crate::adapter::Displayable;
use cascata_types::{CascataError, StandardAd};

/// Turns standard inventory into a displayable surface.
pub trait StandardRenderer: Send + Sync {
    /// Render `ad`.
    ///
    /// # Errors
    /// Returns `Render` if the creative cannot be turned into a surface.
    fn render(&self, ad: &StandardAd) -> Result<Arc<dyn Displayable>, CascataError>;
}
