use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;

use cascata_core::{
    AdapterRegistry, AdapterResult, CancelToken, Displayable, MediatedRequest, StandardRenderer,
    attempt_channel,
};
use cascata_types::{AdSource, CascataError, MediatedSource, OutcomeCode, RequestParams, StandardAd};

/// Collaborators an attempt needs, borrowed from the placement for one cycle.
pub(crate) struct AttemptEnv<'a> {
    pub registry: &'a AdapterRegistry,
    pub renderer: &'a dyn StandardRenderer,
    pub placement_id: &'a str,
    pub params: &'a RequestParams,
    pub mediation_timeout: Duration,
}

/// One evaluation of a waterfall entry.
///
/// Starts unclassified and incomplete. Running it records exactly one terminal
/// classification and, on success, the produced surface.
#[derive(Debug)]
pub(crate) struct MediationAttempt {
    index: usize,
    source: AdSource,
    outcome: Option<OutcomeCode>,
    completed: bool,
    surface: Option<Arc<dyn Displayable>>,
}

enum Wake {
    Cancelled,
    Signal(Option<AdapterResult>),
    Deadline,
}

impl MediationAttempt {
    pub(crate) const fn new(index: usize, source: AdSource) -> Self {
        Self {
            index,
            source,
            outcome: None,
            completed: false,
            surface: None,
        }
    }

    pub(crate) const fn index(&self) -> usize {
        self.index
    }

    pub(crate) const fn source(&self) -> &AdSource {
        &self.source
    }

    pub(crate) fn take_surface(&mut self) -> Option<Arc<dyn Displayable>> {
        self.surface.take()
    }

    fn classify(&mut self, outcome: OutcomeCode, surface: Option<Arc<dyn Displayable>>) {
        if self.completed {
            return;
        }
        self.outcome = Some(outcome);
        self.completed = true;
        self.surface = surface;
    }

    /// Evaluate the entry. Returns `None` when `cancel` fired first, in which
    /// case the attempt stays unclassified.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "cascata::attempt::run",
            skip(self, env, cancel),
            fields(index = self.index, source = %self.source.label()),
        )
    )]
    pub(crate) async fn run(
        &mut self,
        env: &AttemptEnv<'_>,
        cancel: &CancelToken,
    ) -> Option<OutcomeCode> {
        if cancel.is_cancelled() {
            return None;
        }
        match self.source.clone() {
            AdSource::Standard(ad) => self.run_standard(env, &ad),
            AdSource::Mediated(m) => self.run_mediated(env, &m, cancel).await?,
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(outcome = ?self.outcome, "attempt classified");
        self.outcome
    }

    fn run_standard(&mut self, env: &AttemptEnv<'_>, ad: &StandardAd) {
        let rendered = catch_unwind(AssertUnwindSafe(|| env.renderer.render(ad)))
            .unwrap_or_else(|_| Err(CascataError::Render("renderer panicked".into())));
        match rendered {
            Ok(surface) if surface.is_usable() => {
                self.classify(OutcomeCode::Success, Some(surface));
            }
            Ok(surface) => {
                surface.detach();
                self.classify(OutcomeCode::UnableToFill, None);
            }
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %e, "standard entry failed to render");
                self.classify(CascataError::Render(e.to_string()).outcome(), None);
            }
        }
    }

    async fn run_mediated(
        &mut self,
        env: &AttemptEnv<'_>,
        m: &MediatedSource,
        cancel: &CancelToken,
    ) -> Option<()> {
        let banner = match env.registry.resolve_banner(&m.adapter) {
            Ok(banner) => banner,
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %e, "mediated adapter unavailable");
                self.classify(e.outcome(), None);
                return Some(());
            }
        };

        let (signal, mut rx) = attempt_channel();
        let req = MediatedRequest {
            placement_id: env.placement_id,
            params: m.params.as_deref(),
            id: m.id,
            width: m.width,
            height: m.height,
            request: env.params,
        };

        let construction = match catch_unwind(AssertUnwindSafe(|| banner.request_ad(&req, signal))) {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(CascataError::construction(m.adapter.as_str(), e.to_string())),
            Err(_) => Some(CascataError::AdapterPanicked {
                adapter: m.adapter.to_string(),
            }),
        };
        if let Some(err) = construction {
            // A signal raised before the failure still wins.
            if rx.expire() {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %err, "mediated adapter failed to construct");
                rx.detach();
                self.classify(err.outcome(), None);
                return Some(());
            }
            let res = rx.recv().await;
            self.classify_result(res);
            return Some(());
        }

        let wake = tokio::select! {
            biased;
            () = cancel.cancelled() => Wake::Cancelled,
            res = rx.recv() => Wake::Signal(res),
            () = tokio::time::sleep(env.mediation_timeout) => Wake::Deadline,
        };

        match wake {
            Wake::Cancelled => {
                if rx.expire() {
                    rx.detach();
                } else if let Some(AdapterResult::Loaded(surface)) = rx.recv().await {
                    // accepted just before the cancel was observed
                    surface.detach();
                }
                None
            }
            Wake::Signal(res) => {
                self.classify_result(res);
                Some(())
            }
            Wake::Deadline => {
                if rx.expire() {
                    #[cfg(feature = "tracing")]
                    tracing::info!(
                        timeout_ms = u64::try_from(env.mediation_timeout.as_millis()).unwrap_or(u64::MAX),
                        "mediated adapter timed out"
                    );
                    rx.detach();
                    let err = CascataError::AttemptTimeout {
                        adapter: m.adapter.to_string(),
                        timeout_ms: u64::try_from(env.mediation_timeout.as_millis())
                            .unwrap_or(u64::MAX),
                    };
                    self.classify(err.outcome(), None);
                } else {
                    let res = rx.recv().await;
                    self.classify_result(res);
                }
                Some(())
            }
        }
    }

    fn classify_result(&mut self, res: Option<AdapterResult>) {
        match res {
            Some(AdapterResult::Loaded(surface)) if surface.is_usable() => {
                self.classify(OutcomeCode::Success, Some(surface));
            }
            Some(AdapterResult::Loaded(surface)) => {
                surface.detach();
                self.classify(OutcomeCode::UnableToFill, None);
            }
            Some(AdapterResult::Failed(reason)) => self.classify(reason.outcome(), None),
            None => self.classify(OutcomeCode::InternalError, None),
        }
    }
}
