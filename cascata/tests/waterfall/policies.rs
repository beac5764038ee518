use cascata::{CascataError, CycleResolution, OutcomeCode, SourceKind, StandardFailurePolicy};
use cascata_mock::fixtures::response_body;
use cascata_mock::{AdapterBehavior, CallLog, ListenerEvent, MockRenderer, RecordingReporter};

use crate::helpers::*;

#[tokio::test]
async fn failed_standard_entry_advances_by_default() {
    let log = CallLog::new();
    let (a, a_ctrl) = network(NET_A, AdapterBehavior::Load, &log);
    let h = HarnessBuilder::new(plan(vec![standard("<broken"), mediated(NET_A, None)]))
        .network(a)
        .renderer(MockRenderer::failing())
        .build();

    let report = h.run().await;

    assert_eq!(report.attempts[0].outcome, OutcomeCode::InternalError);
    assert_eq!(a_ctrl.invocation_count(), 1);
    assert_eq!(report.resolution, CycleResolution::Loaded { index: 1 });
}

#[tokio::test]
async fn failed_standard_entry_terminates_under_terminate_policy() {
    let log = CallLog::new();
    let (a, a_ctrl) = network(NET_A, AdapterBehavior::Load, &log);
    let h = HarnessBuilder::new(plan(vec![standard("<broken"), mediated(NET_A, None)]))
        .network(a)
        .renderer(MockRenderer::failing())
        .configure(|b| b.standard_failure(StandardFailurePolicy::Terminate))
        .build();

    let report = h.run().await;

    assert_eq!(a_ctrl.invocation_count(), 0);
    assert_eq!(report.resolution, CycleResolution::NoFill);
    assert_eq!(
        h.listener.events(),
        vec![ListenerEvent::Failed(CascataError::Exhausted { attempted: 1 })]
    );
}

#[tokio::test]
async fn panicking_renderer_is_a_local_failure() {
    let log = CallLog::new();
    let (a, a_ctrl) = network(NET_A, AdapterBehavior::Load, &log);
    let h = HarnessBuilder::new(plan(vec![standard("<div>"), mediated(NET_A, None)]))
        .network(a)
        .renderer(MockRenderer::panicking())
        .build();

    let placement = h.placement.clone();
    let report = tokio::spawn(async move { cycle_on(&placement).await })
        .await
        .expect("cycle survives a renderer panic");

    assert_eq!(report.attempts[0].outcome, OutcomeCode::InternalError);
    assert_eq!(a_ctrl.invocation_count(), 1);
    assert_eq!(report.resolution, CycleResolution::Loaded { index: 1 });
    assert_eq!(h.listener.events().len(), 1);
}

#[tokio::test]
async fn panicking_renderer_ends_the_cycle_under_terminate_policy() {
    let h = HarnessBuilder::new(plan(vec![standard("<div>")]))
        .renderer(MockRenderer::panicking())
        .configure(|b| b.standard_failure(StandardFailurePolicy::Terminate))
        .build();

    let report = h.run().await;

    assert_eq!(report.resolution, CycleResolution::NoFill);
    assert_eq!(
        h.listener.events(),
        vec![ListenerEvent::Failed(CascataError::Exhausted { attempted: 1 })]
    );
}

async fn cycle_on(placement: &cascata::Placement) -> cascata::CycleReport {
    placement
        .run_cycle(&cascata::RequestParams::default(), &cascata::CancelToken::new())
        .await
}

#[tokio::test]
async fn report_failures_do_not_affect_the_cycle() {
    let log = CallLog::new();
    let (a, _) = network(NET_A, AdapterBehavior::NoFill, &log);
    let (b, _) = network(NET_B, AdapterBehavior::Load, &log);
    let h = HarnessBuilder::new(plan(vec![
        mediated(NET_A, Some(&report_url(0))),
        mediated(NET_B, Some(&report_url(1))),
    ]))
    .network(a)
    .network(b)
    .reporter(RecordingReporter::failing())
    .build();

    let report = h.run().await;
    h.settle_reports(2).await;

    assert_eq!(report.resolution, CycleResolution::Loaded { index: 1 });
    assert_eq!(h.listener.events().len(), 1);
}

#[tokio::test]
async fn report_response_overrides_remaining_plan_when_enabled() {
    let log = CallLog::new();
    let (a, _) = network(NET_A, AdapterBehavior::NoFill, &log);
    let (b, b_ctrl) = network(NET_B, AdapterBehavior::Load, &log);
    let (c, c_ctrl) = network(NET_C, AdapterBehavior::Load, &log);
    let replacement = response_body(plan(vec![mediated(NET_C, Some(&report_url(9)))]));
    let h = HarnessBuilder::new(plan(vec![
        mediated(NET_A, Some(&report_url(0))),
        mediated(NET_B, Some(&report_url(1))),
    ]))
    .network(a)
    .network(b)
    .network(c)
    .reporter(RecordingReporter::new().with_body(report_url(0), replacement))
    .configure(|b| b.follow_report_overrides(true))
    .build();

    let report = h.run().await;
    h.settle_reports(2).await;

    assert_eq!(b_ctrl.invocation_count(), 0);
    assert_eq!(c_ctrl.invocation_count(), 1);
    assert_eq!(
        h.reporter.codes(),
        vec![OutcomeCode::UnableToFill, OutcomeCode::Success]
    );
    assert_eq!(report.resolution, CycleResolution::Loaded { index: 0 });
    assert_eq!(
        h.listener.events(),
        vec![ListenerEvent::Loaded {
            index: 0,
            kind: SourceKind::Mediated,
            label: NET_C.to_string(),
        }]
    );
}

#[tokio::test]
async fn report_response_is_ignored_when_overrides_are_disabled() {
    let log = CallLog::new();
    let (a, _) = network(NET_A, AdapterBehavior::NoFill, &log);
    let (b, b_ctrl) = network(NET_B, AdapterBehavior::Load, &log);
    let (c, c_ctrl) = network(NET_C, AdapterBehavior::Load, &log);
    let replacement = response_body(plan(vec![mediated(NET_C, None)]));
    let h = HarnessBuilder::new(plan(vec![
        mediated(NET_A, Some(&report_url(0))),
        mediated(NET_B, None),
    ]))
    .network(a)
    .network(b)
    .network(c)
    .reporter(RecordingReporter::new().with_body(report_url(0), replacement))
    .build();

    let report = h.run().await;

    assert_eq!(b_ctrl.invocation_count(), 1);
    assert_eq!(c_ctrl.invocation_count(), 0);
    assert_eq!(report.resolution, CycleResolution::Loaded { index: 1 });
}
