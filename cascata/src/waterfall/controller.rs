use std::collections::VecDeque;

use cascata_core::{CancelToken, LoadedAd, ReportReceipt, parse_override};
use cascata_types::{
    AdSource, AttemptRecord, CascataError, CycleReport, CycleResolution, DispatchedReport,
    OutcomeCode, RequestParams, WaterfallPlan,
};
use tokio::task::JoinHandle;

use super::attempt::{AttemptEnv, MediationAttempt};
use super::state::{Action, CycleState, Event, Waterfall};
use crate::core::{PlacementInner, call_with_timeout};
use crate::report;

/// Runs the I/O side of one cycle: feeds events into [`Waterfall`] and carries
/// out the actions it returns.
pub(crate) struct CycleDriver<'a> {
    placement: &'a PlacementInner,
    params: &'a RequestParams,
    cancel: &'a CancelToken,
    plan: WaterfallPlan,
    current: Option<MediationAttempt>,
    attempts: Vec<AttemptRecord>,
    dispatched: Vec<DispatchedReport>,
    pending_report: Option<(usize, JoinHandle<Option<ReportReceipt>>)>,
    request_error: Option<CascataError>,
    silenced: bool,
}

impl<'a> CycleDriver<'a> {
    pub(crate) fn new(
        placement: &'a PlacementInner,
        params: &'a RequestParams,
        cancel: &'a CancelToken,
    ) -> Self {
        Self {
            placement,
            params,
            cancel,
            plan: WaterfallPlan::default(),
            current: None,
            attempts: Vec::new(),
            dispatched: Vec::new(),
            pending_report: None,
            request_error: None,
            silenced: false,
        }
    }

    pub(crate) async fn run(mut self) -> CycleReport {
        let mut machine = Waterfall::new(self.placement.cfg.standard_failure);
        let mut events = VecDeque::from([Event::Start]);

        while let Some(event) = events.pop_front() {
            let event = if self.cancel.is_cancelled() {
                Event::Cancel
            } else {
                event
            };
            let (next, actions) = machine.handle(event);
            machine = next;

            for action in actions {
                match action {
                    Action::IssueRequest => events.push_back(self.request().await),
                    Action::BeginAttempt { index } => events.push_back(self.attempt(index).await),
                    Action::FileReport { index, code } => self.file_report(index, code),
                    Action::NotifyLoaded { index } => self.notify_loaded(index),
                    Action::NotifyFailed { cause } => self.notify_failed(&cause),
                }
            }

            if let CycleState::Advancing { index } = machine.state {
                events.push_back(self.advance(index).await);
            }
        }

        let resolution = match machine.state {
            _ if self.silenced => CycleResolution::Cancelled,
            CycleState::Succeeded { index } => CycleResolution::Loaded { index },
            CycleState::Exhausted => self
                .request_error
                .take()
                .map_or(CycleResolution::NoFill, CycleResolution::RequestFailed),
            _ => CycleResolution::Cancelled,
        };
        #[cfg(feature = "tracing")]
        tracing::info!(
            attempts = self.attempts.len(),
            reports = self.dispatched.len(),
            resolution = ?resolution,
            "cycle finished"
        );
        CycleReport {
            attempts: self.attempts,
            dispatched: self.dispatched,
            resolution,
        }
    }

    async fn request(&mut self) -> Event {
        let placement = self.placement;
        let cancel = self.cancel;
        let fut = call_with_timeout(
            placement.requester.name(),
            placement.cfg.request_timeout,
            placement.requester.request(&placement.cfg, self.params),
        );
        let res = tokio::select! {
            biased;
            () = cancel.cancelled() => return Event::Cancel,
            res = fut => res,
        };
        match res {
            Ok(plan) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(entries = plan.len(), "waterfall received");
                let len = plan.len();
                self.plan = plan;
                Event::PlanReceived { len }
            }
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %e, "ad request failed");
                self.request_error = Some(e.clone());
                Event::RequestFailed(e)
            }
        }
    }

    async fn attempt(&mut self, index: usize) -> Event {
        let Some(source) = self.plan.get(index).cloned() else {
            return Event::Cancel;
        };
        let kind = source.kind();
        let label = source.label().to_string();
        let reportable = source.report_url().is_some();

        let placement = self.placement;
        let env = AttemptEnv {
            registry: &placement.registry,
            renderer: placement.renderer.as_ref(),
            placement_id: &placement.cfg.placement_id,
            params: self.params,
            mediation_timeout: placement.cfg.mediation_timeout,
        };
        let mut attempt = MediationAttempt::new(index, source);
        let outcome = attempt.run(&env, self.cancel).await;
        self.current = Some(attempt);

        let Some(outcome) = outcome else {
            return Event::Cancel;
        };
        self.attempts.push(AttemptRecord {
            index,
            kind,
            label,
            outcome,
            reported: false,
        });
        Event::AttemptResolved {
            index,
            kind,
            outcome,
            reportable,
        }
    }

    fn file_report(&mut self, index: usize, code: OutcomeCode) {
        let Some(url) = self.plan.get(index).and_then(AdSource::report_url) else {
            return;
        };
        let handle = report::dispatch(&self.placement.reporter, url, code);
        self.dispatched.push(DispatchedReport {
            index,
            url: url.to_string(),
            code,
        });
        if let Some(record) = self.attempts.last_mut() {
            record.reported = true;
        }
        if self.placement.cfg.follow_report_overrides && !code.is_success() {
            self.pending_report = Some((index, handle));
        }
    }

    async fn advance(&mut self, index: usize) -> Event {
        let Some((reported, handle)) = self.pending_report.take() else {
            return Event::Advance;
        };
        if reported != index {
            return Event::Advance;
        }
        let cancel = self.cancel;
        let wait = tokio::time::timeout(self.placement.cfg.mediation_timeout, handle);
        let receipt = tokio::select! {
            biased;
            () = cancel.cancelled() => return Event::Cancel,
            res = wait => res.ok().and_then(Result::ok).flatten(),
        };
        match receipt.and_then(|r| parse_override(&r.body)) {
            Some(plan) => {
                #[cfg(feature = "tracing")]
                tracing::info!(entries = plan.len(), "report response replaced the waterfall");
                let len = plan.len();
                self.plan = plan;
                Event::PlanOverridden { len }
            }
            None => Event::Advance,
        }
    }

    fn notify_loaded(&mut self, index: usize) {
        if self.cancel.is_cancelled() {
            self.silenced = true;
            return;
        }
        let Some(attempt) = self.current.as_mut().filter(|a| a.index() == index) else {
            return;
        };
        let kind = attempt.source().kind();
        let label = attempt.source().label().to_string();
        let Some(surface) = attempt.take_surface() else {
            return;
        };
        let ad = LoadedAd {
            surface,
            index,
            kind,
            label,
        };
        self.placement.listener.on_ad_loaded(&ad);
    }

    fn notify_failed(&mut self, cause: &CascataError) {
        if self.cancel.is_cancelled() {
            self.silenced = true;
            return;
        }
        self.placement.listener.on_ad_request_failed(cause);
    }
}
