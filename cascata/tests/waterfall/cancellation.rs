use std::sync::{Arc, Mutex};
use std::time::Duration;

use cascata::{
    AttemptSignal, BannerAdapter, CancelToken, CascataError, CycleResolution, MediatedRequest,
    MediationNetwork, OutcomeCode, RequestParams,
};
use cascata_mock::{AdapterBehavior, CallLog, MockSurface};

use crate::helpers::*;

#[tokio::test(start_paused = true)]
async fn cancel_mid_waterfall_stops_without_callback() {
    let log = CallLog::new();
    let (a, _) = network(NET_A, AdapterBehavior::NoFill, &log);
    let (b, b_ctrl) = network(NET_B, AdapterBehavior::Hang, &log);
    let (c, c_ctrl) = network(NET_C, AdapterBehavior::Load, &log);
    let h = HarnessBuilder::new(plan(vec![
        mediated(NET_A, Some(&report_url(0))),
        mediated(NET_B, Some(&report_url(1))),
        mediated(NET_C, Some(&report_url(2))),
    ]))
    .network(a)
    .network(b)
    .network(c)
    .build();

    let cancel = CancelToken::new();
    let placement = h.placement.clone();
    let token = cancel.clone();
    let cycle = tokio::spawn(async move {
        placement
            .run_cycle(&RequestParams::default(), &token)
            .await
    });

    assert!(eventually(Duration::from_secs(5), || b_ctrl.invocation_count() == 1).await);
    cancel.cancel();
    let report = cycle.await.expect("cycle task");
    tokio::time::sleep(MEDIATION_TIMEOUT * 2).await;

    assert_eq!(report.resolution, CycleResolution::Cancelled);
    assert_eq!(report.outcome(), None);
    assert_eq!(c_ctrl.invocation_count(), 0);
    assert!(h.listener.events().is_empty());
    assert_eq!(h.reporter.codes(), vec![OutcomeCode::UnableToFill]);
    assert_eq!(b_ctrl.detached_count(), 1);
}

#[tokio::test]
async fn cancelled_token_skips_the_request() {
    let h = HarnessBuilder::new(plan(vec![mediated(NET_A, None)])).build();
    let cancel = CancelToken::new();
    cancel.cancel();

    let report = h
        .placement
        .run_cycle(&RequestParams::default(), &cancel)
        .await;

    assert_eq!(report.resolution, CycleResolution::Cancelled);
    assert_eq!(h.requester.call_count(), 0);
    assert!(h.listener.events().is_empty());
}

/// Loads synchronously, but only after the scheduler has already been told to stop.
struct LoadsWhileStopping {
    cancel: CancelToken,
    surface: Mutex<Option<Arc<MockSurface>>>,
}

impl MediationNetwork for LoadsWhileStopping {
    fn name(&self) -> &'static str {
        NET_A
    }

    fn as_banner_adapter(&self) -> Option<&dyn BannerAdapter> {
        Some(self)
    }
}

impl BannerAdapter for LoadsWhileStopping {
    fn request_ad(
        &self,
        req: &MediatedRequest<'_>,
        signal: AttemptSignal,
    ) -> Result<(), CascataError> {
        let surface = Arc::new(MockSurface::new(req.width, req.height));
        *self.surface.lock().unwrap() = Some(Arc::clone(&surface));
        self.cancel.cancel();
        assert!(signal.loaded(surface));
        Ok(())
    }
}

#[tokio::test]
async fn surface_accepted_as_cancel_lands_is_detached() {
    let cancel = CancelToken::new();
    let net = Arc::new(LoadsWhileStopping {
        cancel: cancel.clone(),
        surface: Mutex::new(None),
    });
    let h = HarnessBuilder::new(plan(vec![mediated(NET_A, Some(&report_url(0)))]))
        .network(net.clone())
        .build();

    let report = h
        .placement
        .run_cycle(&RequestParams::default(), &cancel)
        .await;
    tokio::task::yield_now().await;

    assert_eq!(report.resolution, CycleResolution::Cancelled);
    assert!(h.listener.events().is_empty());
    assert!(h.reporter.calls().is_empty());
    let surface = net.surface.lock().unwrap().clone().expect("adapter ran");
    assert!(surface.was_detached());
}

#[tokio::test(start_paused = true)]
async fn cycle_stays_pending_until_the_mediation_timeout() {
    let log = CallLog::new();
    let (a, _) = network(NET_A, AdapterBehavior::Hang, &log);
    let h = HarnessBuilder::new(plan(vec![mediated(NET_A, None)]))
        .network(a)
        .build();
    let params = RequestParams::default();
    let cancel = CancelToken::new();

    let mut cycle = tokio_test::task::spawn(h.placement.run_cycle(&params, &cancel));
    tokio_test::assert_pending!(cycle.poll());

    tokio::time::advance(MEDIATION_TIMEOUT - Duration::from_millis(1)).await;
    tokio_test::assert_pending!(cycle.poll());

    tokio::time::advance(Duration::from_millis(1)).await;
    let report = tokio_test::assert_ready!(cycle.poll());
    assert_eq!(report.resolution, CycleResolution::NoFill);
    assert_eq!(report.attempts[0].outcome, OutcomeCode::InternalError);
}
