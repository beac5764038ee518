use std::time::Duration;

use cascata::{CascataError, CycleResolution, OutcomeCode};
use cascata_mock::{AdapterBehavior, CallLog, ListenerEvent};

use crate::helpers::*;

#[tokio::test(start_paused = true)]
async fn success_after_timeout_is_discarded() {
    let log = CallLog::new();
    let (a, a_ctrl) = network(
        NET_A,
        AdapterBehavior::LoadAfter(MEDIATION_TIMEOUT + Duration::from_secs(5)),
        &log,
    );
    let (b, _) = network(NET_B, AdapterBehavior::NoFill, &log);
    let h = HarnessBuilder::new(plan(vec![
        mediated(NET_A, Some(&report_url(0))),
        mediated(NET_B, Some(&report_url(1))),
    ]))
    .network(a)
    .network(b)
    .build();

    let report = h.run().await;
    tokio::time::sleep(Duration::from_secs(30)).await;

    assert_eq!(a_ctrl.late_signals(), vec![false]);
    assert_eq!(
        h.reporter.codes(),
        vec![OutcomeCode::InternalError, OutcomeCode::UnableToFill]
    );
    assert_eq!(report.resolution, CycleResolution::NoFill);
    assert_eq!(
        h.listener.events(),
        vec![ListenerEvent::Failed(CascataError::Exhausted { attempted: 2 })]
    );
}

#[tokio::test(start_paused = true)]
async fn signal_within_timeout_wins() {
    let log = CallLog::new();
    let (a, a_ctrl) = network(
        NET_A,
        AdapterBehavior::LoadAfter(Duration::from_secs(3)),
        &log,
    );
    let h = HarnessBuilder::new(plan(vec![mediated(NET_A, Some(&report_url(0)))]))
        .network(a)
        .build();

    let started = tokio::time::Instant::now();
    let report = h.run().await;
    h.settle_reports(1).await;

    assert!(started.elapsed() < MEDIATION_TIMEOUT);
    assert_eq!(a_ctrl.late_signals(), vec![true]);
    assert_eq!(h.reporter.codes(), vec![OutcomeCode::Success]);
    assert_eq!(report.resolution, CycleResolution::Loaded { index: 0 });
}

#[tokio::test(start_paused = true)]
async fn delayed_no_fill_advances() {
    let log = CallLog::new();
    let (a, _) = network(
        NET_A,
        AdapterBehavior::NoFillAfter(Duration::from_secs(2)),
        &log,
    );
    let (b, _) = network(NET_B, AdapterBehavior::Load, &log);
    let h = HarnessBuilder::new(plan(vec![
        mediated(NET_A, Some(&report_url(0))),
        mediated(NET_B, Some(&report_url(1))),
    ]))
    .network(a)
    .network(b)
    .build();

    let report = h.run().await;
    h.settle_reports(2).await;

    assert_eq!(
        h.reporter.codes(),
        vec![OutcomeCode::UnableToFill, OutcomeCode::Success]
    );
    assert_eq!(report.resolution, CycleResolution::Loaded { index: 1 });
}
