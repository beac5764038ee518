use std::sync::Arc;
use std::time::Duration;

use cascata::{
    AdRequester, CascataError, LoadedAd, OutcomeReporter, Placement, PlacementListener,
};
use cascata_mock::fixtures::{mediated, plan, report_url, standard};
use cascata_mock::{
    AdapterBehavior, DynamicMockNetwork, MockRenderer, RecordingReporter, ScriptedRequester,
};

/// Environment variable naming a live ad-server endpoint.
pub const AD_SERVER_ENV: &str = "CASCATA_AD_SERVER";

/// Prints owner callbacks to stdout.
#[derive(Debug, Default)]
pub struct PrintingListener;

impl PlacementListener for PrintingListener {
    fn on_ad_loaded(&self, ad: &LoadedAd) {
        println!(
            "loaded {} ad from entry {} ({})",
            ad.kind, ad.index, ad.label
        );
    }

    fn on_ad_request_failed(&self, cause: &CascataError) {
        println!("no ad: {cause}");
    }
}

fn transports() -> (Arc<dyn AdRequester>, Arc<dyn OutcomeReporter>) {
    if let Ok(base) = std::env::var(AD_SERVER_ENV) {
        println!("--- (Using ad server at {base}) ---");
        match cascata_http::HttpTransportBuilder::new().base_url(base).build() {
            Ok(t) => return (t.requester, t.reporter),
            Err(e) => println!("--- ({e}; falling back to mocks) ---"),
        }
    }
    let requester = ScriptedRequester::returning(plan(vec![
        mediated("demo.EmptyNet", Some(&report_url(0))),
        mediated("demo.SlowNet", Some(&report_url(1))),
        mediated("demo.GoodNet", Some(&report_url(2))),
        standard("<div>house ad</div>"),
    ]));
    (Arc::new(requester), Arc::new(RecordingReporter::new()))
}

/// Build a demo placement with three mock networks: one without inventory,
/// one that answers after `slow_by`, and one that always fills.
///
/// Without [`AD_SERVER_ENV`] the plan is scripted locally.
///
/// # Errors
/// Returns `InvalidArg` if the placement configuration is rejected.
pub fn demo_placement(slow_by: Duration, refresh: Duration) -> Result<Placement, CascataError> {
    let (requester, reporter) = transports();

    let (empty, empty_ctrl) = DynamicMockNetwork::new_with_controller("demo.EmptyNet");
    empty_ctrl.set_behavior(AdapterBehavior::NoFill);
    let (slow, slow_ctrl) = DynamicMockNetwork::new_with_controller("demo.SlowNet");
    slow_ctrl.set_behavior(AdapterBehavior::LoadAfter(slow_by));
    let (good, _) = DynamicMockNetwork::new_with_controller("demo.GoodNet");

    Placement::builder()
        .placement_id("demo-banner")
        .size(320, 50)
        .refresh_period(refresh)
        .mediation_timeout(Duration::from_millis(200))
        .requester(requester)
        .reporter(reporter)
        .with_network(empty)
        .with_network(slow)
        .with_network(good)
        .renderer(Arc::new(MockRenderer::new()))
        .listener(Arc::new(PrintingListener))
        .build()
}
