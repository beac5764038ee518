//! Mock collaborators for exercising cascata placements without a network.
//!
//! - [`DynamicMockNetwork`]: mediation network driven by a controller.
//! - [`ScriptedRequester`]: ad requester replaying scripted responses.
//! - [`RecordingReporter`] / [`RecordingListener`]: capture what a cycle emitted.
//! - [`MockRenderer`], [`MockSurface`], [`ScriptedIdentity`].

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use cascata_core::{
    AdRequester, CascataError, Displayable, IdentityProvider, LoadedAd, MediationNetwork,
    OutcomeCode, OutcomeReporter, PlacementConfig, PlacementListener, ReportReceipt,
    RequestParams, SourceKind, StandardAd, StandardRenderer, WaterfallPlan, outcome_url,
};
use tokio::sync::Notify;
use tokio::time::Instant;

mod dynamic;
pub mod fixtures;

pub use dynamic::{AdapterBehavior, DynamicMockController, DynamicMockNetwork, Invocation};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn wait_until<F: Fn() -> bool>(notify: &Notify, ready: F, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        let notified = notify.notified();
        if ready() {
            return true;
        }
        if tokio::time::timeout_at(deadline, notified).await.is_err() {
            return ready();
        }
    }
}

/// Instruction for how a scripted call should behave.
#[derive(Clone, Debug)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Fail immediately with the provided error.
    Fail(CascataError),
    /// Hang indefinitely (simulate a timeout).
    Hang,
}

/// Shared, ordered event log for asserting cross-component ordering.
#[derive(Clone, Debug, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&self, entry: impl Into<String>) {
        lock(&self.entries).push(entry.into());
    }

    /// Copy of the entries so far.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        lock(&self.entries).clone()
    }
}

/// Displayable surface that records whether it was detached.
#[derive(Debug)]
pub struct MockSurface {
    width: u32,
    height: u32,
    usable: bool,
    detached: AtomicBool,
}

impl MockSurface {
    /// Usable surface of the given size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            usable: true,
            detached: AtomicBool::new(false),
        }
    }

    /// Surface that reports itself as not showable.
    #[must_use]
    pub const fn unusable(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            usable: false,
            detached: AtomicBool::new(false),
        }
    }

    /// Whether `detach` has been called.
    #[must_use]
    pub fn was_detached(&self) -> bool {
        self.detached.load(Ordering::SeqCst)
    }
}

impl Displayable for MockSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn is_usable(&self) -> bool {
        self.usable
    }

    fn detach(&self) {
        self.detached.store(true, Ordering::SeqCst);
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum RenderMode {
    #[default]
    Render,
    Fail,
    Panic,
}

/// Renderer that wraps standard entries in [`MockSurface`]s.
#[derive(Debug, Default)]
pub struct MockRenderer {
    mode: RenderMode,
    renders: AtomicUsize,
}

impl MockRenderer {
    /// Renderer that always succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Renderer that always fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            mode: RenderMode::Fail,
            renders: AtomicUsize::new(0),
        }
    }

    /// Renderer that panics on every call, like a parser choking on markup.
    #[must_use]
    pub fn panicking() -> Self {
        Self {
            mode: RenderMode::Panic,
            renders: AtomicUsize::new(0),
        }
    }

    /// Number of render calls.
    #[must_use]
    pub fn renders(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }
}

impl StandardRenderer for MockRenderer {
    fn render(&self, ad: &StandardAd) -> Result<Arc<dyn Displayable>, CascataError> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            RenderMode::Render => Ok(Arc::new(MockSurface::new(ad.width, ad.height))),
            RenderMode::Fail => Err(CascataError::Render(format!(
                "cannot render {} bytes of markup",
                ad.content.len()
            ))),
            RenderMode::Panic => panic!("markup parser crashed on {:?}", ad.content),
        }
    }
}

/// Mediation network without the banner capability.
#[derive(Debug, Default)]
pub struct InterstitialOnlyNetwork;

impl MediationNetwork for InterstitialOnlyNetwork {
    fn name(&self) -> &'static str {
        "mock.InterstitialOnly"
    }

    fn vendor(&self) -> &'static str {
        "Mock"
    }
}

/// One call made to a [`ScriptedRequester`].
#[derive(Clone, Debug)]
pub struct RequestCall {
    /// Time of the call on the Tokio clock.
    pub at: Instant,
    /// Placement id of the request.
    pub placement_id: String,
    /// Attributes sent with the request.
    pub params: RequestParams,
}

/// Ad requester replaying scripted responses in order. The last response
/// repeats once the script is exhausted.
pub struct ScriptedRequester {
    script: Mutex<VecDeque<MockBehavior<WaterfallPlan>>>,
    last: Mutex<MockBehavior<WaterfallPlan>>,
    calls: Mutex<Vec<RequestCall>>,
    notify: Notify,
}

impl ScriptedRequester {
    /// Requester that always returns `plan`.
    #[must_use]
    pub fn returning(plan: WaterfallPlan) -> Self {
        Self::scripted(vec![MockBehavior::Return(plan)])
    }

    /// Requester replaying `script`.
    #[must_use]
    pub fn scripted(script: Vec<MockBehavior<WaterfallPlan>>) -> Self {
        let last = script
            .last()
            .cloned()
            .unwrap_or(MockBehavior::Return(WaterfallPlan::default()));
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(last),
            calls: Mutex::new(Vec::new()),
            notify: Notify::new(),
        }
    }

    /// Calls received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<RequestCall> {
        lock(&self.calls).clone()
    }

    /// Number of calls received so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Wait until at least `n` calls arrived. Returns `false` on timeout.
    pub async fn wait_for(&self, n: usize, timeout: Duration) -> bool {
        wait_until(&self.notify, || self.call_count() >= n, timeout).await
    }
}

#[async_trait]
impl AdRequester for ScriptedRequester {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn request(
        &self,
        placement: &PlacementConfig,
        params: &RequestParams,
    ) -> Result<WaterfallPlan, CascataError> {
        let behavior = {
            let next = lock(&self.script).pop_front();
            next.unwrap_or_else(|| lock(&self.last).clone())
        };
        lock(&self.calls).push(RequestCall {
            at: Instant::now(),
            placement_id: placement.placement_id.clone(),
            params: params.clone(),
        });
        self.notify.notify_waiters();
        match behavior {
            MockBehavior::Return(plan) => Ok(plan),
            MockBehavior::Fail(e) => Err(e),
            MockBehavior::Hang => {
                std::future::pending::<()>().await;
                Err(CascataError::Other("unreachable".into()))
            }
        }
    }
}

/// One report received by a [`RecordingReporter`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportCall {
    /// Template as carried by the waterfall entry.
    pub template: String,
    /// Code reported.
    pub code: OutcomeCode,
    /// Resolved URL.
    pub url: String,
}

/// Outcome reporter that records every report in call order.
#[derive(Default)]
pub struct RecordingReporter {
    calls: Mutex<Vec<ReportCall>>,
    bodies: Mutex<HashMap<String, String>>,
    fail: bool,
    notify: Notify,
}

impl RecordingReporter {
    /// Reporter answering every report with an empty 200.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reporter that records reports and then fails them.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Answer reports filed against `template` with `body`.
    #[must_use]
    pub fn with_body(self, template: impl Into<String>, body: impl Into<String>) -> Self {
        lock(&self.bodies).insert(template.into(), body.into());
        self
    }

    /// Reports received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<ReportCall> {
        lock(&self.calls).clone()
    }

    /// Codes received so far, in call order.
    #[must_use]
    pub fn codes(&self) -> Vec<OutcomeCode> {
        lock(&self.calls).iter().map(|c| c.code).collect()
    }

    /// Wait until at least `n` reports arrived. Returns `false` on timeout.
    pub async fn wait_for(&self, n: usize, timeout: Duration) -> bool {
        wait_until(&self.notify, || lock(&self.calls).len() >= n, timeout).await
    }
}

#[async_trait]
impl OutcomeReporter for RecordingReporter {
    async fn report(
        &self,
        template: &str,
        code: OutcomeCode,
    ) -> Result<ReportReceipt, CascataError> {
        let url = outcome_url(template, code)?;
        lock(&self.calls).push(ReportCall {
            template: template.to_string(),
            code,
            url: url.clone(),
        });
        self.notify.notify_waiters();
        if self.fail {
            return Err(CascataError::report(url, "status 503"));
        }
        let body = lock(&self.bodies).get(template).cloned().unwrap_or_default();
        Ok(ReportReceipt {
            url,
            status: 200,
            body,
        })
    }
}

/// What a [`RecordingListener`] was told.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListenerEvent {
    /// `on_ad_loaded` for the entry at `index`.
    Loaded {
        /// Index of the winning entry.
        index: usize,
        /// Kind of the winning entry.
        kind: SourceKind,
        /// Adapter id or `"standard"`.
        label: String,
    },
    /// `on_ad_request_failed` with the cause.
    Failed(CascataError),
}

/// Placement listener that records every callback.
#[derive(Default)]
pub struct RecordingListener {
    events: Mutex<Vec<ListenerEvent>>,
    surfaces: Mutex<Vec<Arc<dyn Displayable>>>,
    notify: Notify,
}

impl RecordingListener {
    /// Empty listener.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Callbacks received so far.
    #[must_use]
    pub fn events(&self) -> Vec<ListenerEvent> {
        lock(&self.events).clone()
    }

    /// Surfaces handed over by `on_ad_loaded`.
    #[must_use]
    pub fn surfaces(&self) -> Vec<Arc<dyn Displayable>> {
        lock(&self.surfaces).clone()
    }

    /// Wait until at least `n` callbacks arrived. Returns `false` on timeout.
    pub async fn wait_for(&self, n: usize, timeout: Duration) -> bool {
        wait_until(&self.notify, || lock(&self.events).len() >= n, timeout).await
    }
}

impl PlacementListener for RecordingListener {
    fn on_ad_loaded(&self, ad: &LoadedAd) {
        lock(&self.surfaces).push(Arc::clone(&ad.surface));
        lock(&self.events).push(ListenerEvent::Loaded {
            index: ad.index,
            kind: ad.kind,
            label: ad.label.clone(),
        });
        self.notify.notify_waiters();
    }

    fn on_ad_request_failed(&self, cause: &CascataError) {
        lock(&self.events).push(ListenerEvent::Failed(cause.clone()));
        self.notify.notify_waiters();
    }
}

/// Identity provider that fails its first `failures` calls.
#[derive(Debug, Default)]
pub struct ScriptedIdentity {
    params: RequestParams,
    failures: AtomicUsize,
    calls: AtomicUsize,
}

impl ScriptedIdentity {
    /// Provider returning `params` after `failures` failed calls.
    #[must_use]
    pub const fn new(params: RequestParams, failures: usize) -> Self {
        Self {
            params,
            failures: AtomicUsize::new(failures),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of calls so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IdentityProvider for ScriptedIdentity {
    fn request_params(&self) -> Result<RequestParams, CascataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(CascataError::Identity("device id not ready".into()));
        }
        Ok(self.params.clone())
    }
}
