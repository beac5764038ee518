use std::sync::Arc;
use std::time::Duration;

use cascata::RequestParams;
use cascata_mock::{AdapterBehavior, CallLog, ScriptedIdentity};
use tokio::time::Instant;

use crate::helpers::*;

const PERIOD: Duration = Duration::from_secs(30);

fn harness(tweak: impl FnOnce(cascata::PlacementBuilder) -> cascata::PlacementBuilder + 'static) -> Harness {
    let log = CallLog::new();
    let (a, _) = network(NET_A, AdapterBehavior::Load, &log);
    HarnessBuilder::new(plan(vec![mediated(NET_A, None)]))
        .network(a)
        .configure(move |b| tweak(b.refresh_period(PERIOD)))
        .build()
}

fn offsets(h: &Harness, start: Instant) -> Vec<Duration> {
    h.requester.calls().iter().map(|c| c.at - start).collect()
}

#[tokio::test(start_paused = true)]
async fn fires_immediately_then_once_per_period() {
    let h = harness(|b| b);
    let start = Instant::now();
    let mut scheduler = h.placement.scheduler();
    scheduler.start().await;

    assert!(h.requester.wait_for(3, Duration::from_secs(65)).await);
    scheduler.stop().await;

    assert_eq!(
        offsets(&h, start)[..3],
        [Duration::ZERO, PERIOD, PERIOD * 2]
    );
    assert!(h.listener.wait_for(3, SETTLE).await);
}

#[tokio::test(start_paused = true)]
async fn period_change_applies_to_later_fires() {
    let h = harness(|b| b);
    let start = Instant::now();
    let mut scheduler = h.placement.scheduler();
    scheduler.start().await;
    assert!(h.requester.wait_for(1, SETTLE).await);

    tokio::time::sleep(Duration::from_secs(1)).await;
    scheduler.set_period(Duration::from_secs(10));
    assert_eq!(scheduler.period(), Duration::from_secs(10));

    assert!(h.requester.wait_for(3, Duration::from_secs(60)).await);
    scheduler.stop().await;

    assert_eq!(
        offsets(&h, start)[..3],
        [Duration::ZERO, PERIOD, PERIOD + Duration::from_secs(10)]
    );
}

#[tokio::test(start_paused = true)]
async fn zero_period_fires_once() {
    let h = harness(|b| b.refresh_period(Duration::ZERO));
    let mut scheduler = h.placement.scheduler();
    scheduler.start().await;

    assert!(h.requester.wait_for(1, SETTLE).await);
    tokio::time::sleep(Duration::from_secs(300)).await;

    assert_eq!(h.requester.call_count(), 1);
    assert!(!scheduler.is_running());
}

#[tokio::test(start_paused = true)]
async fn identity_failure_skips_only_that_fire() {
    let identity = Arc::new(ScriptedIdentity::new(
        RequestParams::builder().carrier("acme").build(),
        1,
    ));
    let id = Arc::clone(&identity);
    let h = harness(move |b| b.identity(id));
    let start = Instant::now();
    let mut scheduler = h.placement.scheduler();
    scheduler.start().await;

    assert!(h.requester.wait_for(1, Duration::from_secs(35)).await);
    scheduler.stop().await;

    assert_eq!(identity.calls(), 2);
    assert_eq!(offsets(&h, start), vec![PERIOD]);
    assert_eq!(h.requester.calls()[0].params.carrier(), "acme");
}
