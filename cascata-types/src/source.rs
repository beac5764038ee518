//! Waterfall entries and the plan that orders them.

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::connector::AdapterId;

/// Primary-inventory ad carried directly in the ad response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardAd {
    /// Opaque creative payload handed to the renderer.
    pub content: String,
    /// Creative width.
    #[serde(default)]
    pub width: u32,
    /// Creative height.
    #[serde(default)]
    pub height: u32,
}

/// Descriptor for delegating an ad request to a third-party adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediatedSource {
    /// Adapter identifier resolved through the registry.
    pub adapter: AdapterId,
    /// Opaque parameter blob forwarded to the adapter untouched.
    #[serde(default)]
    pub params: Option<String>,
    /// Network-side ad unit id.
    #[serde(default)]
    pub id: u64,
    /// Requested width.
    #[serde(default)]
    pub width: u32,
    /// Requested height.
    #[serde(default)]
    pub height: u32,
    /// Outcome-report URL template; `None` or empty means "do not report".
    #[serde(default)]
    pub report_url: Option<String>,
}

impl MediatedSource {
    /// Report URL if present and non-empty.
    #[must_use]
    pub fn report_url(&self) -> Option<&str> {
        self.report_url.as_deref().filter(|u| !u.trim().is_empty())
    }
}

/// One candidate entry in a waterfall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AdSource {
    /// Native fallback: render the carried creative directly.
    Standard(StandardAd),
    /// Third-party adapter invocation.
    Mediated(MediatedSource),
}

impl AdSource {
    /// Kind label of this entry.
    #[must_use]
    pub const fn kind(&self) -> SourceKind {
        match self {
            Self::Standard(_) => SourceKind::Standard,
            Self::Mediated(_) => SourceKind::Mediated,
        }
    }

    /// Label used in logs and attempt records: the adapter id, or `"standard"`.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Standard(_) => SourceKind::Standard.as_str(),
            Self::Mediated(m) => m.adapter.as_str(),
        }
    }

    /// Report URL if this entry files outcome reports.
    ///
    /// Standard entries never report.
    #[must_use]
    pub fn report_url(&self) -> Option<&str> {
        match self {
            Self::Standard(_) => None,
            Self::Mediated(m) => m.report_url(),
        }
    }
}

/// Discriminant of [`AdSource`] for records and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// [`AdSource::Standard`].
    Standard,
    /// [`AdSource::Mediated`].
    Mediated,
}

impl SourceKind {
    /// Stable identifier for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Mediated => "mediated",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered sequence of ad sources returned by one ad-request call.
///
/// Insertion order is priority order: index 0 is tried first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WaterfallPlan {
    sources: Vec<AdSource>,
}

impl WaterfallPlan {
    /// Build a plan from sources in priority order.
    #[must_use]
    pub const fn new(sources: Vec<AdSource>) -> Self {
        Self { sources }
    }

    /// Consume the plan, returning its sources in priority order.
    #[must_use]
    pub fn into_sources(self) -> Vec<AdSource> {
        self.sources
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether the plan has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Entry at `index`, if any.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&AdSource> {
        self.sources.get(index)
    }

    /// Iterate entries in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &AdSource> {
        self.sources.iter()
    }

    /// Borrow the entries as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[AdSource] {
        &self.sources
    }
}

impl FromIterator<AdSource> for WaterfallPlan {
    fn from_iter<I: IntoIterator<Item = AdSource>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a WaterfallPlan {
    type Item = &'a AdSource;
    type IntoIter = core::slice::Iter<'a, AdSource>;

    fn into_iter(self) -> Self::IntoIter {
        self.sources.iter()
    }
}
