use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use cascata_core::CancelToken;
use cascata_core::handle::ScheduleGuard;
use tokio::task::JoinHandle;

use crate::core::Placement;

fn to_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Fires a placement's ad-request cycle immediately and then once per period.
///
/// At most one cycle runs at a time: each fire is awaited before the next one
/// is armed. A fire that fails (including a panic inside the cycle) is logged
/// and the schedule carries on.
///
/// Dropping the scheduler stops it: the in-flight cycle is cancelled and the
/// loop task is aborted if it is still running.
pub struct RefreshScheduler {
    placement: Placement,
    period_ms: Arc<AtomicU64>,
    guard: ScheduleGuard<JoinHandle<()>, CancelToken>,
}

impl std::fmt::Debug for RefreshScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshScheduler")
            .field("placement", &self.placement.config().placement_id)
            .field("period", &self.period())
            .field("running", &self.is_running())
            .finish()
    }
}

impl RefreshScheduler {
    /// A stopped scheduler for `placement`.
    #[must_use]
    pub fn new(placement: Placement, period: Duration) -> Self {
        Self {
            placement,
            period_ms: Arc::new(AtomicU64::new(to_millis(period))),
            guard: ScheduleGuard::idle(),
        }
    }

    /// Current refresh period.
    #[must_use]
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms.load(Ordering::Acquire))
    }

    /// Change the refresh period.
    ///
    /// Only fires armed after this call use the new value; a fire that is
    /// already waiting keeps its deadline. Zero makes the schedule stop after
    /// its next fire.
    pub fn set_period(&self, period: Duration) {
        self.period_ms.store(to_millis(period), Ordering::Release);
    }

    /// Whether the schedule loop is alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.guard.is_running()
    }

    /// Start firing: once now, then every period.
    ///
    /// A running schedule is fully stopped first.
    pub async fn start(&mut self) {
        self.stop().await;
        let cancel = CancelToken::new();
        let task = tokio::spawn(schedule_loop(
            self.placement.clone(),
            Arc::clone(&self.period_ms),
            cancel.clone(),
        ));
        self.guard = ScheduleGuard::new(task, cancel);
    }

    /// Cancel pending fires and abort the in-flight cycle, then wait for the
    /// loop to wind down.
    ///
    /// The aborted cycle does not advance further and does not notify the
    /// listener. Reports it already dispatched are not recalled.
    pub async fn stop(&mut self) {
        if let Some((task, cancel)) = self.guard.release() {
            cancel.cancel();
            let _ = task.await;
        }
    }
}

async fn schedule_loop(placement: Placement, period_ms: Arc<AtomicU64>, cancel: CancelToken) {
    loop {
        let fired_at = tokio::time::Instant::now();
        fire(&placement, &cancel).await;
        if cancel.is_cancelled() {
            break;
        }

        let period = Duration::from_millis(period_ms.load(Ordering::Acquire));
        if period.is_zero() {
            #[cfg(feature = "tracing")]
            tracing::debug!("zero refresh period; schedule idle after single fire");
            break;
        }
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep_until(fired_at + period) => {}
        }
    }
}

#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        name = "cascata::scheduler::fire",
        skip(placement, cancel),
        fields(placement = %placement.config().placement_id),
    )
)]
async fn fire(placement: &Placement, cancel: &CancelToken) {
    let p = placement.clone();
    let c = cancel.clone();
    let cycle = tokio::spawn(async move {
        let params = p.inner.identity.request_params()?;
        Ok::<_, cascata_types::CascataError>(p.run_cycle(&params, &c).await)
    });
    match cycle.await {
        Ok(Ok(_report)) => {
            #[cfg(feature = "tracing")]
            tracing::debug!(resolution = ?_report.resolution, "fire complete");
        }
        Ok(Err(_e)) => {
            #[cfg(feature = "tracing")]
            tracing::warn!(error = %_e, "could not assemble request parameters; skipping fire");
        }
        Err(_join) => {
            #[cfg(feature = "tracing")]
            tracing::error!(error = %_join, "cycle task failed");
        }
    }
}
