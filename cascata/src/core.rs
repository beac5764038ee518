use std::sync::Arc;
use std::time::Duration;

use cascata_core::{
    AdRequester, AdapterRegistry, CancelToken, Displayable, IdentityProvider, MediationNetwork,
    NoopListener, OutcomeReporter, PlacementListener, StandardRenderer, StaticIdentity,
};
use cascata_types::{
    CascataError, CycleReport, PlacementConfig, RequestParams, StandardAd, StandardFailurePolicy,
};

use crate::scheduler::RefreshScheduler;
use crate::waterfall::controller::CycleDriver;

/// One ad slot: its configuration plus every collaborator a cycle needs.
///
/// Cheap to clone; clones share the same collaborators.
#[derive(Clone)]
pub struct Placement {
    pub(crate) inner: Arc<PlacementInner>,
}

pub(crate) struct PlacementInner {
    pub(crate) cfg: PlacementConfig,
    pub(crate) requester: Arc<dyn AdRequester>,
    pub(crate) reporter: Arc<dyn OutcomeReporter>,
    pub(crate) registry: AdapterRegistry,
    pub(crate) renderer: Arc<dyn StandardRenderer>,
    pub(crate) listener: Arc<dyn PlacementListener>,
    pub(crate) identity: Arc<dyn IdentityProvider>,
}

impl std::fmt::Debug for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Placement")
            .field("cfg", &self.inner.cfg)
            .field("requester", &self.inner.requester.name())
            .field("registry", &self.inner.registry)
            .finish_non_exhaustive()
    }
}

struct NoRenderer;

impl StandardRenderer for NoRenderer {
    fn render(&self, _ad: &StandardAd) -> Result<Arc<dyn Displayable>, CascataError> {
        Err(CascataError::Render("no standard renderer configured".into()))
    }
}

/// Builder for constructing a [`Placement`].
pub struct PlacementBuilder {
    cfg: PlacementConfig,
    requester: Option<Arc<dyn AdRequester>>,
    reporter: Option<Arc<dyn OutcomeReporter>>,
    registry: AdapterRegistry,
    renderer: Option<Arc<dyn StandardRenderer>>,
    listener: Option<Arc<dyn PlacementListener>>,
    identity: Option<Arc<dyn IdentityProvider>>,
}

impl Default for PlacementBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PlacementBuilder {
    /// Create a new builder with default configuration and no collaborators.
    ///
    /// A requester and a reporter are mandatory. Without a renderer standard
    /// entries fail to render; without a listener results are dropped; without
    /// an identity provider every request carries empty attributes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cfg: PlacementConfig::default(),
            requester: None,
            reporter: None,
            registry: AdapterRegistry::new(),
            renderer: None,
            listener: None,
            identity: None,
        }
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: PlacementConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Set the placement identifier sent with every ad request.
    #[must_use]
    pub fn placement_id(mut self, id: impl Into<String>) -> Self {
        self.cfg.placement_id = id.into();
        self
    }

    /// Request a fixed ad size.
    #[must_use]
    pub const fn size(mut self, width: u32, height: u32) -> Self {
        self.cfg.width = Some(width);
        self.cfg.height = Some(height);
        self
    }

    /// Interval between scheduled fires. Zero makes the scheduler single-shot.
    #[must_use]
    pub const fn refresh_period(mut self, period: Duration) -> Self {
        self.cfg.refresh_period = period;
        self
    }

    /// Bound on each mediated adapter invocation.
    #[must_use]
    pub const fn mediation_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.mediation_timeout = timeout;
        self
    }

    /// Bound on the ad-request call.
    #[must_use]
    pub const fn request_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.request_timeout = timeout;
        self
    }

    /// Choose how failed standard entries are handled.
    #[must_use]
    pub const fn standard_failure(mut self, policy: StandardFailurePolicy) -> Self {
        self.cfg.standard_failure = policy;
        self
    }

    /// Await reports of failed mediated entries and follow a replacement plan
    /// carried in their response.
    #[must_use]
    pub const fn follow_report_overrides(mut self, yes: bool) -> Self {
        self.cfg.follow_report_overrides = yes;
        self
    }

    /// Transport issuing ad requests.
    #[must_use]
    pub fn requester(mut self, requester: Arc<dyn AdRequester>) -> Self {
        self.requester = Some(requester);
        self
    }

    /// Transport filing outcome reports.
    #[must_use]
    pub fn reporter(mut self, reporter: Arc<dyn OutcomeReporter>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    /// Replace the adapter registry.
    #[must_use]
    pub fn registry(mut self, registry: AdapterRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Register a mediation network under its own name.
    #[must_use]
    pub fn with_network(mut self, network: Arc<dyn MediationNetwork>) -> Self {
        self.registry.register(network);
        self
    }

    /// Renderer for standard entries.
    #[must_use]
    pub fn renderer(mut self, renderer: Arc<dyn StandardRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Owner receiving the result of each cycle.
    #[must_use]
    pub fn listener(mut self, listener: Arc<dyn PlacementListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Source of request attributes for scheduled fires.
    #[must_use]
    pub fn identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Build the `Placement`.
    ///
    /// # Errors
    /// Returns `InvalidArg` if the placement id is empty, a timeout is zero, or
    /// no requester or reporter has been provided.
    pub fn build(self) -> Result<Placement, CascataError> {
        if self.cfg.placement_id.trim().is_empty() {
            return Err(CascataError::InvalidArg(
                "placement id must not be empty".to_string(),
            ));
        }
        if self.cfg.mediation_timeout.is_zero() || self.cfg.request_timeout.is_zero() {
            return Err(CascataError::InvalidArg(
                "mediation and request timeouts must be positive".to_string(),
            ));
        }
        let requester = self.requester.ok_or_else(|| {
            CascataError::InvalidArg("no requester configured; add one via requester(...)".into())
        })?;
        let reporter = self.reporter.ok_or_else(|| {
            CascataError::InvalidArg("no reporter configured; add one via reporter(...)".into())
        })?;

        Ok(Placement {
            inner: Arc::new(PlacementInner {
                cfg: self.cfg,
                requester,
                reporter,
                registry: self.registry,
                renderer: self.renderer.unwrap_or_else(|| Arc::new(NoRenderer)),
                listener: self.listener.unwrap_or_else(|| Arc::new(NoopListener)),
                identity: self
                    .identity
                    .unwrap_or_else(|| Arc::new(StaticIdentity::default())),
            }),
        })
    }
}

/// Wrap an ad-request future with a timeout and standardized timeout error mapping.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "cascata::core::call_with_timeout",
        skip(fut),
        fields(
            requester = requester_name,
            timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        ),
    )
)]
pub(crate) async fn call_with_timeout<T, Fut>(
    requester_name: &'static str,
    timeout: Duration,
    fut: Fut,
) -> Result<T, CascataError>
where
    Fut: core::future::Future<Output = Result<T, CascataError>>,
{
    (tokio::time::timeout(timeout, fut).await).unwrap_or_else(|_| {
        Err(CascataError::RequestTimeout {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        })
    })
}

impl Placement {
    /// Start building a new `Placement`.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// let placement = cascata::Placement::builder()
    ///     .placement_id("home-banner")
    ///     .size(320, 50)
    ///     .refresh_period(Duration::from_secs(30))
    ///     .requester(Arc::new(http.requester()))
    ///     .reporter(Arc::new(http.reporter()))
    ///     .with_network(Arc::new(MyNetwork::default()))
    ///     .renderer(Arc::new(MyRenderer))
    ///     .listener(Arc::new(MyOwner))
    ///     .build()?;
    /// let mut scheduler = placement.scheduler();
    /// scheduler.start().await;
    /// ```
    #[must_use]
    pub fn builder() -> PlacementBuilder {
        PlacementBuilder::new()
    }

    /// Configuration this placement was built with.
    #[must_use]
    pub fn config(&self) -> &PlacementConfig {
        &self.inner.cfg
    }

    /// Adapter registry consulted for mediated entries.
    #[must_use]
    pub fn registry(&self) -> &AdapterRegistry {
        &self.inner.registry
    }

    /// A stopped scheduler for this placement using the configured refresh period.
    #[must_use]
    pub fn scheduler(&self) -> RefreshScheduler {
        RefreshScheduler::new(self.clone(), self.inner.cfg.refresh_period)
    }

    /// Run one full cycle: request a plan, walk the waterfall, report outcomes
    /// and notify the listener.
    ///
    /// Cancelling `cancel` stops the walk at the next suspension point; the
    /// listener is then not notified and the report resolves to `Cancelled`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "cascata::core::run_cycle",
            skip(self, params, cancel),
            fields(placement = %self.inner.cfg.placement_id),
        )
    )]
    pub async fn run_cycle(&self, params: &RequestParams, cancel: &CancelToken) -> CycleReport {
        CycleDriver::new(&self.inner, params, cancel).run().await
    }

    /// Run one cycle with attributes from the identity provider.
    ///
    /// # Errors
    /// Returns `Identity` if the attributes cannot be gathered.
    pub async fn load_once(&self) -> Result<CycleReport, CascataError> {
        let params = self.inner.identity.request_params()?;
        Ok(self.run_cycle(&params, &CancelToken::new()).await)
    }
}
