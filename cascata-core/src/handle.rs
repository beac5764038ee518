//! Ownership of a running schedule: its loop task and the token that stops it.

use tokio::task::JoinHandle;

use crate::cancel::CancelToken;

/// Loop task of a schedule.
pub trait LoopTask {
    /// Whether the loop has returned.
    fn is_finished(&self) -> bool;
    /// Stop polling the loop. Tasks the loop spawned keep running.
    fn abort(&self);
}

impl LoopTask for JoinHandle<()> {
    fn is_finished(&self) -> bool {
        Self::is_finished(self)
    }

    fn abort(&self) {
        Self::abort(self);
    }
}

/// Signal asking a schedule and the cycle it is running to wind down.
pub trait StopSignal {
    /// Raise the signal. Idempotent.
    fn raise(&self);
}

impl StopSignal for CancelToken {
    fn raise(&self) {
        self.cancel();
    }
}

/// Holds a schedule's loop task together with its stop signal.
///
/// Dropping a guard that still holds a schedule tears it down: the stop
/// signal is raised first so an in-flight cycle ends quietly on its own, then
/// the loop is aborted if it has not returned. The cycle task is never
/// aborted; it observes the signal at its next suspension point.
#[derive(Debug)]
pub struct ScheduleGuard<T: LoopTask, S: StopSignal> {
    running: Option<(T, S)>,
}

impl<T: LoopTask, S: StopSignal> Default for ScheduleGuard<T, S> {
    fn default() -> Self {
        Self::idle()
    }
}

impl<T: LoopTask, S: StopSignal> ScheduleGuard<T, S> {
    /// A guard holding nothing.
    #[must_use]
    pub const fn idle() -> Self {
        Self { running: None }
    }

    /// A guard owning `task`, stopped by `stop`.
    #[must_use]
    pub const fn new(task: T, stop: S) -> Self {
        Self {
            running: Some((task, stop)),
        }
    }

    /// Whether a schedule is held and its loop has not returned.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.as_ref().is_some_and(|(t, _)| !t.is_finished())
    }

    /// Release the schedule for a graceful stop, leaving the guard idle.
    pub fn release(&mut self) -> Option<(T, S)> {
        self.running.take()
    }

    /// Raise the stop signal, then abort the loop if it is still running.
    pub fn teardown(&mut self) {
        if let Some((task, stop)) = self.running.take() {
            stop.raise();
            if !task.is_finished() {
                task.abort();
            }
        }
    }
}

impl<T: LoopTask, S: StopSignal> Drop for ScheduleGuard<T, S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
