use cascata::{CycleResolution, OutcomeCode};
use cascata_mock::{AdapterBehavior, CallLog, ListenerEvent};

use crate::helpers::*;

#[tokio::test]
async fn entries_are_tried_strictly_in_order() {
    let log = CallLog::new();
    let (a, _) = network(NET_A, AdapterBehavior::NoFill, &log);
    let (b, _) = network(NET_B, AdapterBehavior::NoFill, &log);
    let (c, _) = network(NET_C, AdapterBehavior::Load, &log);
    let h = HarnessBuilder::new(plan(vec![
        mediated(NET_A, None),
        mediated(NET_B, None),
        mediated(NET_C, None),
    ]))
    .network(a)
    .network(b)
    .network(c)
    .build();

    let report = h.run().await;

    assert_eq!(
        log.entries(),
        vec![
            format!("invoke:{NET_A}"),
            format!("signal:{NET_A}"),
            format!("invoke:{NET_B}"),
            format!("signal:{NET_B}"),
            format!("invoke:{NET_C}"),
            format!("signal:{NET_C}"),
        ]
    );
    let indices: Vec<usize> = report.attempts.iter().map(|a| a.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert_eq!(report.resolution, CycleResolution::Loaded { index: 2 });
}

#[tokio::test]
async fn success_stops_the_waterfall() {
    let log = CallLog::new();
    let (a, _) = network(NET_A, AdapterBehavior::Load, &log);
    let (b, b_ctrl) = network(NET_B, AdapterBehavior::Load, &log);
    let h = HarnessBuilder::new(plan(vec![
        mediated(NET_A, Some(&report_url(0))),
        mediated(NET_B, Some(&report_url(1))),
    ]))
    .network(a)
    .network(b)
    .build();

    let report = h.run().await;
    h.settle_reports(1).await;

    assert_eq!(b_ctrl.invocation_count(), 0);
    assert_eq!(report.dispatched_codes(), vec![OutcomeCode::Success]);
    assert_eq!(h.reporter.codes(), vec![OutcomeCode::Success]);
    assert_eq!(
        h.listener.events(),
        vec![ListenerEvent::Loaded {
            index: 0,
            kind: cascata::SourceKind::Mediated,
            label: NET_A.to_string(),
        }]
    );
}

#[tokio::test]
async fn no_fill_then_success_reports_both_and_keeps_failed_surface_away() {
    let log = CallLog::new();
    let (a, a_ctrl) = network(NET_A, AdapterBehavior::NoFill, &log);
    let (b, b_ctrl) = network(NET_B, AdapterBehavior::Load, &log);
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
    assert_eq!(
        report.dispatched_codes(),
        vec![OutcomeCode::UnableToFill, OutcomeCode::Success]
    );
    assert_eq!(h.listener.events().len(), 1);
    assert!(a_ctrl.surfaces().is_empty());
    assert_eq!(h.listener.surfaces().len(), 1);
    assert_eq!(b_ctrl.surfaces().len(), 1);
}

#[tokio::test]
async fn no_fill_then_standard_renders_without_second_report() {
    let log = CallLog::new();
    let (a, _) = network(NET_A, AdapterBehavior::NoFill, &log);
    let h = HarnessBuilder::new(plan(vec![
        mediated(NET_A, Some(&report_url(0))),
        standard("<div>house ad</div>"),
    ]))
    .network(a)
    .build();

    let report = h.run().await;
    h.settle_reports(1).await;
    tokio::task::yield_now().await;

    assert_eq!(h.reporter.codes(), vec![OutcomeCode::UnableToFill]);
    assert_eq!(h.renderer.renders(), 1);
    assert_eq!(report.resolution, CycleResolution::Loaded { index: 1 });
    assert_eq!(
        h.listener.events(),
        vec![ListenerEvent::Loaded {
            index: 1,
            kind: cascata::SourceKind::Standard,
            label: "standard".to_string(),
        }]
    );
}

#[tokio::test]
async fn missing_or_empty_report_url_files_nothing() {
    let log = CallLog::new();
    let (a, _) = network(NET_A, AdapterBehavior::NoFill, &log);
    let (b, _) = network(NET_B, AdapterBehavior::Load, &log);
    let h = HarnessBuilder::new(plan(vec![
        mediated(NET_A, Some("   ")),
        mediated(NET_B, None),
    ]))
    .network(a)
    .network(b)
    .build();

    let report = h.run().await;
    tokio::task::yield_now().await;

    assert!(report.dispatched.is_empty());
    assert!(report.attempts.iter().all(|a| !a.reported));
    assert!(h.reporter.calls().is_empty());
    assert_eq!(report.resolution, CycleResolution::Loaded { index: 1 });
}
