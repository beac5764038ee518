use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::adapter::{BannerAdapter, MediationNetwork};
use cascata_types::{AdapterId, CascataError};

/// Lookup table from adapter identifiers to mediation networks.
///
/// Waterfall entries name their adapter by identifier; the registry is how a
/// placement turns that identifier into something it can call.
#[derive(Default, Clone)]
pub struct AdapterRegistry {
    networks: HashMap<String, Arc<dyn MediationNetwork>>,
}

impl fmt::Debug for AdapterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<String> = self
            .networks
            .iter()
            .map(|(id, net)| format!("{id} ({})", net.vendor()))
            .collect();
        entries.sort_unstable();
        f.debug_struct("AdapterRegistry")
            .field("networks", &entries)
            .finish()
    }
}

impl AdapterRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a network under its own name.
    #[must_use]
    pub fn with_network(mut self, network: Arc<dyn MediationNetwork>) -> Self {
        self.register(network);
        self
    }

    /// Register a network under its own name, replacing any previous entry.
    pub fn register(&mut self, network: Arc<dyn MediationNetwork>) {
        self.networks.insert(network.name().to_string(), network);
    }

    /// Register a network under an additional identifier.
    pub fn register_as(&mut self, id: impl Into<AdapterId>, network: Arc<dyn MediationNetwork>) {
        self.networks.insert(id.into().as_str().to_string(), network);
    }

    /// Number of registered identifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.networks.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    /// Look up a network by identifier.
    #[must_use]
    pub fn get(&self, id: &AdapterId) -> Option<&Arc<dyn MediationNetwork>> {
        self.networks.get(id.as_str())
    }

    /// Resolve the banner capability of the network registered under `id`.
    ///
    /// # Errors
    /// Returns `AdapterNotFound` if nothing is registered under `id`, or
    /// `MissingCapability` if the network cannot serve banners.
    pub fn resolve_banner(&self, id: &AdapterId) -> Result<&dyn BannerAdapter, CascataError> {
        let network = self
            .get(id)
            .ok_or_else(|| CascataError::adapter_not_found(id.as_str()))?;
        network
            .as_banner_adapter()
            .ok_or_else(|| CascataError::missing_capability(id.as_str(), "banner"))
    }
}
