//! Single-fire result channel between a mediation attempt and its adapter.
//!
//! An attempt has three ways to end: the adapter loads a surface, the adapter
//! fails, or the controller gives up waiting. The slot records whichever happens
//! first in a tri-state flag (pending, resolved-success, resolved-failure). Every
//! later signal is rejected and reported back to the adapter as `false`.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{oneshot, watch};

use crate::adapter::Displayable;
use cascata_types::OutcomeCode;

const PENDING: u8 = 0;
const RESOLVED_SUCCESS: u8 = 1;
const RESOLVED_FAILURE: u8 = 2;

/// Why an adapter could not produce an ad.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AdapterFailure {
    /// The network had no inventory for this request.
    NoFill,
    /// The network SDK is missing or refused to run.
    Unavailable(String),
    /// Anything else that went wrong inside the adapter.
    Internal(String),
}

impl AdapterFailure {
    /// Outcome code recorded for an attempt that ended with this failure.
    #[must_use]
    pub const fn outcome(&self) -> OutcomeCode {
        match self {
            Self::NoFill => OutcomeCode::UnableToFill,
            Self::Unavailable(_) => OutcomeCode::MediatedSdkUnavailable,
            Self::Internal(_) => OutcomeCode::InternalError,
        }
    }
}

impl fmt::Display for AdapterFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoFill => f.write_str("no fill"),
            Self::Unavailable(msg) => write!(f, "sdk unavailable: {msg}"),
            Self::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

/// The winning signal of an attempt.
#[derive(Debug)]
pub enum AdapterResult {
    /// The adapter produced a surface.
    Loaded(Arc<dyn Displayable>),
    /// The adapter gave up.
    Failed(AdapterFailure),
}

struct SignalSlot {
    state: AtomicU8,
    tx: Mutex<Option<oneshot::Sender<AdapterResult>>>,
    detach_tx: watch::Sender<bool>,
}

impl SignalSlot {
    fn claim(&self, target: u8) -> bool {
        self.state
            .compare_exchange(PENDING, target, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn resolve(&self, target: u8, result: AdapterResult) -> bool {
        if !self.claim(target) {
            return false;
        }
        let tx = self
            .tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(tx) = tx {
            let _ = tx.send(result);
        }
        true
    }
}

/// Adapter-side handle used to report the result of one attempt.
///
/// Cheap to clone; all clones share the same slot, so only the first call to
/// [`loaded`](Self::loaded) or [`failed`](Self::failed) across all clones wins.
#[derive(Clone)]
pub struct AttemptSignal {
    slot: Arc<SignalSlot>,
    detach_rx: watch::Receiver<bool>,
}

impl fmt::Debug for AttemptSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttemptSignal")
            .field("resolved", &self.is_resolved())
            .field("detached", &self.is_detached())
            .finish()
    }
}

impl AttemptSignal {
    /// Report a loaded surface. Returns `false` if the attempt was already resolved.
    pub fn loaded(&self, surface: Arc<dyn Displayable>) -> bool {
        let accepted = self
            .slot
            .resolve(RESOLVED_SUCCESS, AdapterResult::Loaded(surface));
        #[cfg(feature = "tracing")]
        if !accepted {
            tracing::debug!("discarding late load signal");
        }
        accepted
    }

    /// Report a failure. Returns `false` if the attempt was already resolved.
    pub fn failed(&self, reason: AdapterFailure) -> bool {
        #[cfg(feature = "tracing")]
        let label = reason.to_string();
        let accepted = self
            .slot
            .resolve(RESOLVED_FAILURE, AdapterResult::Failed(reason));
        #[cfg(feature = "tracing")]
        if !accepted {
            tracing::debug!(reason = %label, "discarding late failure signal");
        }
        accepted
    }

    /// Shorthand for `failed(AdapterFailure::NoFill)`.
    pub fn no_fill(&self) -> bool {
        self.failed(AdapterFailure::NoFill)
    }

    /// Whether any terminal signal (including a timeout) has been recorded.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.slot.state.load(Ordering::Acquire) != PENDING
    }

    /// Whether the controller has stopped listening to this attempt.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        *self.detach_rx.borrow()
    }

    /// Resolves once the controller stops listening to this attempt.
    pub async fn detached(&self) {
        let mut rx = self.detach_rx.clone();
        // A closed channel means the receiver side is gone, which is a detach too.
        let _ = rx.wait_for(|detached| *detached).await;
    }
}

/// Controller-side half of an attempt channel.
pub struct SignalReceiver {
    slot: Arc<SignalSlot>,
    rx: oneshot::Receiver<AdapterResult>,
}

impl fmt::Debug for SignalReceiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalReceiver")
            .field("state", &self.slot.state.load(Ordering::Acquire))
            .finish_non_exhaustive()
    }
}

impl SignalReceiver {
    /// Wait for the winning signal.
    ///
    /// Returns `None` once the attempt has been expired. If every
    /// [`AttemptSignal`] clone is dropped without reporting this pends until the
    /// caller's own timeout fires.
    pub async fn recv(&mut self) -> Option<AdapterResult> {
        (&mut self.rx).await.ok()
    }

    /// Mark the attempt as failed without a result, typically on timeout.
    ///
    /// Returns `true` if the expiry won. When it returns `false` an adapter
    /// signal got there first and its result is available through
    /// [`recv`](Self::recv).
    pub fn expire(&self) -> bool {
        if !self.slot.claim(RESOLVED_FAILURE) {
            return false;
        }
        drop(
            self.slot
                .tx
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take(),
        );
        true
    }

    /// Tell the adapter to stop working on this attempt.
    pub fn detach(&self) {
        self.slot.detach_tx.send_replace(true);
    }
}

impl Drop for SignalReceiver {
    fn drop(&mut self) {
        // An abandoned pending attempt is expired so the adapter's late signals bounce.
        if self.expire() {
            self.detach();
        }
    }
}

/// Create a fresh pending attempt channel.
#[must_use]
pub fn attempt_channel() -> (AttemptSignal, SignalReceiver) {
    let (tx, rx) = oneshot::channel();
    let (detach_tx, detach_rx) = watch::channel(false);
    let slot = Arc::new(SignalSlot {
        state: AtomicU8::new(PENDING),
        tx: Mutex::new(Some(tx)),
        detach_tx,
    });
    (
        AttemptSignal {
            slot: Arc::clone(&slot),
            detach_rx,
        },
        SignalReceiver { slot, rx },
    )
}
