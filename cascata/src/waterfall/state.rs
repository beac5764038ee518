//! Pure transition logic of one ad-request cycle.
//!
//! The machine owns no I/O. The controller feeds it events and carries out the
//! actions it returns, which keeps ordering rules testable without a runtime.

use cascata_types::{CascataError, OutcomeCode, SourceKind, StandardFailurePolicy};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Requesting,
    Evaluating { index: usize },
    Advancing { index: usize },
    Succeeded { index: usize },
    Exhausted,
    Cancelled,
}

impl CycleState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded { .. } | Self::Exhausted | Self::Cancelled)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    Start,
    PlanReceived { len: usize },
    RequestFailed(CascataError),
    AttemptResolved {
        index: usize,
        kind: SourceKind,
        outcome: OutcomeCode,
        /// The entry carries a report URL.
        reportable: bool,
    },
    /// Move past the failed entry.
    Advance,
    /// A report response replaced the rest of the plan.
    PlanOverridden { len: usize },
    Cancel,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    IssueRequest,
    BeginAttempt { index: usize },
    FileReport { index: usize, code: OutcomeCode },
    NotifyLoaded { index: usize },
    NotifyFailed { cause: CascataError },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Waterfall {
    pub state: CycleState,
    /// Length of the plan currently being traversed.
    pub len: usize,
    /// Attempts begun so far, across overrides.
    pub attempted: usize,
    pub standard_failure: StandardFailurePolicy,
}

impl Waterfall {
    #[must_use]
    pub const fn new(standard_failure: StandardFailurePolicy) -> Self {
        Self {
            state: CycleState::Idle,
            len: 0,
            attempted: 0,
            standard_failure,
        }
    }

    /// Apply `event`. Events that do not fit the current state are dropped
    /// without effect, which is how stale attempt results are discarded.
    pub fn handle(mut self, event: Event) -> (Self, Vec<Action>) {
        use CycleState as S;

        match (self.state, event) {
            (S::Idle, Event::Start) => {
                self.state = S::Requesting;
                (self, vec![Action::IssueRequest])
            }
            (S::Requesting, Event::PlanReceived { len }) => {
                self.len = len;
                self.begin(0)
            }
            (S::Requesting, Event::RequestFailed(cause)) => {
                self.state = S::Exhausted;
                (self, vec![Action::NotifyFailed { cause }])
            }
            (
                S::Evaluating { index },
                Event::AttemptResolved {
                    index: resolved,
                    kind,
                    outcome,
                    reportable,
                },
            ) if index == resolved => {
                let mut actions = Vec::new();
                if reportable && kind == SourceKind::Mediated {
                    actions.push(Action::FileReport {
                        index,
                        code: outcome,
                    });
                }
                if outcome.is_success() {
                    self.state = S::Succeeded { index };
                    actions.push(Action::NotifyLoaded { index });
                } else if kind == SourceKind::Standard
                    && self.standard_failure == StandardFailurePolicy::Terminate
                {
                    self.state = S::Exhausted;
                    actions.push(self.exhausted());
                } else {
                    self.state = S::Advancing { index };
                }
                (self, actions)
            }
            (S::Advancing { index }, Event::Advance) => self.begin(index + 1),
            (S::Advancing { index }, Event::PlanOverridden { len }) => {
                if len == 0 {
                    return self.begin(index + 1);
                }
                self.len = len;
                self.begin(0)
            }
            (state, Event::Cancel) if !state.is_terminal() => {
                self.state = S::Cancelled;
                (self, Vec::new())
            }
            _ => (self, Vec::new()),
        }
    }

    fn begin(mut self, index: usize) -> (Self, Vec<Action>) {
        if index >= self.len {
            self.state = CycleState::Exhausted;
            let action = self.exhausted();
            return (self, vec![action]);
        }
        self.state = CycleState::Evaluating { index };
        self.attempted += 1;
        (self, vec![Action::BeginAttempt { index }])
    }

    const fn exhausted(&self) -> Action {
        Action::NotifyFailed {
            cause: CascataError::Exhausted {
                attempted: self.attempted,
            },
        }
    }
}
