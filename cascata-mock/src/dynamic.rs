use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use cascata_core::{
    AdapterFailure, AttemptSignal, BannerAdapter, CascataError, MediatedRequest, MediationNetwork,
};

use crate::{CallLog, MockSurface};

/// Instruction for how a banner request should behave.
#[derive(Clone, Debug)]
pub enum AdapterBehavior {
    /// Signal a usable surface before returning.
    Load,
    /// Signal a surface that reports itself unusable.
    LoadUnusable,
    /// Signal no-fill before returning.
    NoFill,
    /// Signal the given failure before returning.
    Fail(AdapterFailure),
    /// Never signal (simulate a stalled network SDK).
    Hang,
    /// Return an error from `request_ad` without signalling.
    FailConstruction(String),
    /// Panic inside `request_ad`.
    Panic,
    /// Signal a usable surface from a background task after the delay.
    LoadAfter(Duration),
    /// Signal no-fill from a background task after the delay.
    NoFillAfter(Duration),
}

/// One recorded `request_ad` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    /// Opaque parameter blob forwarded from the entry.
    pub params: Option<String>,
    /// Network-side id from the entry.
    pub id: u64,
    /// Requested width.
    pub width: u32,
    /// Requested height.
    pub height: u32,
}

struct InternalState {
    behavior: AdapterBehavior,
    invocations: Vec<Invocation>,
    /// Results of delayed signals: `true` if the attempt accepted them.
    late_signals: Vec<bool>,
    detached: usize,
    surfaces: Vec<Arc<MockSurface>>,
}

fn lock(state: &Mutex<InternalState>) -> std::sync::MutexGuard<'_, InternalState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
#[derive(Clone)]
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockController {
    /// Set the behavior for subsequent banner requests.
    pub fn set_behavior(&self, behavior: AdapterBehavior) {
        lock(&self.state).behavior = behavior;
    }

    /// Return a copy of the invocation log.
    #[must_use]
    pub fn invocations(&self) -> Vec<Invocation> {
        lock(&self.state).invocations.clone()
    }

    /// Number of banner requests received.
    #[must_use]
    pub fn invocation_count(&self) -> usize {
        lock(&self.state).invocations.len()
    }

    /// Results of delayed signals, in the order they were raised.
    #[must_use]
    pub fn late_signals(&self) -> Vec<bool> {
        lock(&self.state).late_signals.clone()
    }

    /// Number of hung requests the controller told to detach.
    #[must_use]
    pub fn detached_count(&self) -> usize {
        lock(&self.state).detached
    }

    /// Surfaces handed out so far.
    #[must_use]
    pub fn surfaces(&self) -> Vec<Arc<MockSurface>> {
        lock(&self.state).surfaces.clone()
    }

    /// Clear the logs and reset the behavior to `Load`.
    pub fn clear_all(&self) {
        let mut guard = lock(&self.state);
        guard.behavior = AdapterBehavior::Load;
        guard.invocations.clear();
        guard.late_signals.clear();
        guard.detached = 0;
        guard.surfaces.clear();
    }
}

/// A mediation network that defers all behavior to an external controller.
pub struct DynamicMockNetwork {
    name: &'static str,
    state: Arc<Mutex<InternalState>>,
    log: Option<CallLog>,
}

impl DynamicMockNetwork {
    /// Create a new dynamic mock network and its controller. Requests load by default.
    #[must_use]
    pub fn new_with_controller(
        name: &'static str,
    ) -> (Arc<dyn MediationNetwork>, DynamicMockController) {
        Self::build(name, None)
    }

    /// Like [`new_with_controller`](Self::new_with_controller), also appending
    /// `invoke:<name>` and `signal:<name>` entries to a shared log.
    #[must_use]
    pub fn new_with_log(
        name: &'static str,
        log: CallLog,
    ) -> (Arc<dyn MediationNetwork>, DynamicMockController) {
        Self::build(name, Some(log))
    }

    fn build(
        name: &'static str,
        log: Option<CallLog>,
    ) -> (Arc<dyn MediationNetwork>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState {
            behavior: AdapterBehavior::Load,
            invocations: Vec::new(),
            late_signals: Vec::new(),
            detached: 0,
            surfaces: Vec::new(),
        }));
        let controller = DynamicMockController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self { name, state, log });
        (me as Arc<dyn MediationNetwork>, controller)
    }

    fn surface(&self, usable: bool, width: u32, height: u32) -> Arc<MockSurface> {
        let surface = Arc::new(if usable {
            MockSurface::new(width, height)
        } else {
            MockSurface::unusable(width, height)
        });
        lock(&self.state).surfaces.push(Arc::clone(&surface));
        surface
    }

    fn record(&self, what: &str) {
        if let Some(log) = &self.log {
            log.push(format!("{what}:{}", self.name));
        }
    }
}

impl MediationNetwork for DynamicMockNetwork {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        "DynamicMock"
    }

    fn as_banner_adapter(&self) -> Option<&dyn BannerAdapter> {
        Some(self as &dyn BannerAdapter)
    }
}

impl BannerAdapter for DynamicMockNetwork {
    fn request_ad(
        &self,
        req: &MediatedRequest<'_>,
        signal: AttemptSignal,
    ) -> Result<(), CascataError> {
        // Snapshot behavior without holding the lock while signalling
        let behavior = {
            let mut guard = lock(&self.state);
            guard.invocations.push(Invocation {
                params: req.params.map(str::to_string),
                id: req.id,
                width: req.width,
                height: req.height,
            });
            guard.behavior.clone()
        };
        self.record("invoke");

        match behavior {
            AdapterBehavior::Load => {
                self.record("signal");
                signal.loaded(self.surface(true, req.width, req.height));
            }
            AdapterBehavior::LoadUnusable => {
                self.record("signal");
                signal.loaded(self.surface(false, req.width, req.height));
            }
            AdapterBehavior::NoFill => {
                self.record("signal");
                signal.no_fill();
            }
            AdapterBehavior::Fail(reason) => {
                self.record("signal");
                signal.failed(reason);
            }
            AdapterBehavior::Hang => {
                let state = Arc::clone(&self.state);
                tokio::spawn(async move {
                    signal.detached().await;
                    lock(&state).detached += 1;
                });
            }
            AdapterBehavior::FailConstruction(msg) => {
                return Err(CascataError::construction(self.name, msg));
            }
            AdapterBehavior::Panic => {
                panic!("{} exploded while constructing", self.name);
            }
            AdapterBehavior::LoadAfter(delay) => {
                let surface = self.surface(true, req.width, req.height);
                self.spawn_late(delay, signal, move |s| s.loaded(surface));
            }
            AdapterBehavior::NoFillAfter(delay) => {
                self.spawn_late(delay, signal, |s| s.no_fill());
            }
        }
        Ok(())
    }
}

impl DynamicMockNetwork {
    fn spawn_late<F>(&self, delay: Duration, signal: AttemptSignal, raise: F)
    where
        F: FnOnce(&AttemptSignal) -> bool + Send + 'static,
    {
        let state = Arc::clone(&self.state);
        let log = self.log.clone();
        let name = self.name;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(log) = &log {
                log.push(format!("signal:{name}"));
            }
            let accepted = raise(&signal);
            lock(&state).late_signals.push(accepted);
        });
    }
}
