use std::sync::Arc;
use std::time::Duration;

use cascata::{CascataError, CycleResolution, OutcomeCode};
use cascata_mock::{AdapterBehavior, CallLog, InterstitialOnlyNetwork, ListenerEvent};

use crate::helpers::*;

#[tokio::test]
async fn unregistered_adapter_is_sdk_unavailable() {
    let h = HarnessBuilder::new(plan(vec![mediated(MISSING, Some(&report_url(0)))])).build();

    let report = h.run().await;
    h.settle_reports(1).await;

    assert_eq!(
        h.reporter.codes(),
        vec![OutcomeCode::MediatedSdkUnavailable]
    );
    assert_eq!(report.resolution, CycleResolution::NoFill);
    assert_eq!(
        h.listener.events(),
        vec![ListenerEvent::Failed(CascataError::Exhausted { attempted: 1 })]
    );
}

#[tokio::test]
async fn network_without_banner_capability_is_sdk_unavailable() {
    let log = CallLog::new();
    let (b, b_ctrl) = network(NET_B, AdapterBehavior::Load, &log);
    let h = HarnessBuilder::new(plan(vec![
        mediated("mock.InterstitialOnly", Some(&report_url(0))),
        mediated(NET_B, None),
    ]))
    .network(Arc::new(InterstitialOnlyNetwork))
    .network(b)
    .build();

    let report = h.run().await;
    h.settle_reports(1).await;

    assert_eq!(report.attempts[0].outcome, OutcomeCode::MediatedSdkUnavailable);
    assert_eq!(b_ctrl.invocation_count(), 1);
    assert_eq!(report.resolution, CycleResolution::Loaded { index: 1 });
}

#[tokio::test]
async fn construction_error_and_panic_are_sdk_unavailable() {
    let log = CallLog::new();
    let (a, _) = network(
        NET_A,
        AdapterBehavior::FailConstruction("class init failed".into()),
        &log,
    );
    let (b, _) = network(NET_B, AdapterBehavior::Panic, &log);
    let (c, _) = network(NET_C, AdapterBehavior::Load, &log);
    let h = HarnessBuilder::new(plan(vec![
        mediated(NET_A, Some(&report_url(0))),
        mediated(NET_B, Some(&report_url(1))),
        mediated(NET_C, Some(&report_url(2))),
    ]))
    .network(a)
    .network(b)
    .network(c)
    .build();

    let report = h.run().await;
    h.settle_reports(3).await;

    assert_eq!(
        h.reporter.codes(),
        vec![
            OutcomeCode::MediatedSdkUnavailable,
            OutcomeCode::MediatedSdkUnavailable,
            OutcomeCode::Success,
        ]
    );
    assert_eq!(report.resolution, CycleResolution::Loaded { index: 2 });
}

#[tokio::test(start_paused = true)]
async fn silent_adapter_times_out_as_internal_error() {
    let log = CallLog::new();
    let (a, a_ctrl) = network(NET_A, AdapterBehavior::Hang, &log);
    let (b, _) = network(NET_B, AdapterBehavior::Load, &log);
    let h = HarnessBuilder::new(plan(vec![
        mediated(NET_A, Some(&report_url(0))),
        mediated(NET_B, Some(&report_url(1))),
    ]))
    .network(a)
    .network(b)
    .build();

    let started = tokio::time::Instant::now();
    let report = h.run().await;
    h.settle_reports(2).await;

    assert!(started.elapsed() >= MEDIATION_TIMEOUT);
    assert_eq!(
        h.reporter.codes(),
        vec![OutcomeCode::InternalError, OutcomeCode::Success]
    );
    assert_eq!(report.resolution, CycleResolution::Loaded { index: 1 });
    assert!(eventually(Duration::from_secs(1), || a_ctrl.detached_count() == 1).await);
}

#[tokio::test]
async fn unusable_surface_counts_as_no_fill() {
    let log = CallLog::new();
    let (a, a_ctrl) = network(NET_A, AdapterBehavior::LoadUnusable, &log);
    let h = HarnessBuilder::new(plan(vec![mediated(NET_A, Some(&report_url(0)))]))
        .network(a)
        .build();

    let report = h.run().await;
    h.settle_reports(1).await;

    assert_eq!(h.reporter.codes(), vec![OutcomeCode::UnableToFill]);
    assert_eq!(report.resolution, CycleResolution::NoFill);
    assert!(a_ctrl.surfaces()[0].was_detached());
}

#[tokio::test]
async fn exhaustion_reports_every_entry_with_a_url_and_fails_once() {
    let log = CallLog::new();
    let (a, _) = network(NET_A, AdapterBehavior::NoFill, &log);
    let (b, _) = network(
        NET_B,
        AdapterBehavior::Fail(cascata::AdapterFailure::Internal("sdk crashed".into())),
        &log,
    );
    let (c, _) = network(NET_C, AdapterBehavior::NoFill, &log);
    let h = HarnessBuilder::new(plan(vec![
        mediated(NET_A, Some(&report_url(0))),
        mediated(NET_B, None),
        mediated(NET_C, Some(&report_url(2))),
        mediated(MISSING, Some(&report_url(3))),
    ]))
    .network(a)
    .network(b)
    .network(c)
    .build();

    let report = h.run().await;
    h.settle_reports(3).await;

    assert_eq!(
        h.reporter.codes(),
        vec![
            OutcomeCode::UnableToFill,
            OutcomeCode::UnableToFill,
            OutcomeCode::MediatedSdkUnavailable,
        ]
    );
    let outcomes: Vec<OutcomeCode> = report.attempts.iter().map(|a| a.outcome).collect();
    assert_eq!(
        outcomes,
        vec![
            OutcomeCode::UnableToFill,
            OutcomeCode::InternalError,
            OutcomeCode::UnableToFill,
            OutcomeCode::MediatedSdkUnavailable,
        ]
    );
    assert_eq!(
        h.listener.events(),
        vec![ListenerEvent::Failed(CascataError::Exhausted { attempted: 4 })]
    );
}

#[tokio::test]
async fn report_urls_carry_the_reason() {
    let log = CallLog::new();
    let (a, _) = network(NET_A, AdapterBehavior::NoFill, &log);
    let h = HarnessBuilder::new(plan(vec![
        mediated(NET_A, Some("https://track.example/r/{reason}?entry=0")),
        mediated(MISSING, Some(&report_url(1))),
    ]))
    .network(a)
    .build();

    h.run().await;
    h.settle_reports(2).await;

    let urls: Vec<String> = h.reporter.calls().into_iter().map(|c| c.url).collect();
    assert_eq!(
        urls,
        vec![
            "https://track.example/r/2?entry=0".to_string(),
            "https://track.example/result?entry=1&reason=3".to_string(),
        ]
    );
}
