use std::sync::Arc;

use cascata::{CycleResolution, MediationNetwork, OutcomeCode};
use cascata_mock::{AdapterBehavior, CallLog, ListenerEvent};
use proptest::prelude::*;

use crate::helpers::*;

const NAMES: [&str; 6] = [
    "prop.Net0",
    "prop.Net1",
    "prop.Net2",
    "prop.Net3",
    "prop.Net4",
    "prop.Net5",
];

#[derive(Clone, Copy, Debug)]
enum Entry {
    Load,
    NoFill,
    Construction,
    Unregistered,
}

fn entry() -> impl Strategy<Value = Entry> {
    prop_oneof![
        Just(Entry::Load),
        Just(Entry::NoFill),
        Just(Entry::Construction),
        Just(Entry::Unregistered),
    ]
}

fn expected(e: Entry) -> OutcomeCode {
    match e {
        Entry::Load => OutcomeCode::Success,
        Entry::NoFill => OutcomeCode::UnableToFill,
        Entry::Construction | Entry::Unregistered => OutcomeCode::MediatedSdkUnavailable,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn waterfall_walks_in_order_and_stops_at_first_success(
        entries in proptest::collection::vec(entry(), 1..=NAMES.len()),
        with_url in proptest::collection::vec(any::<bool>(), NAMES.len()),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        rt.block_on(async {
            let log = CallLog::new();
            let mut sources = Vec::new();
            let mut networks: Vec<Arc<dyn MediationNetwork>> = Vec::new();
            for (i, e) in entries.iter().enumerate() {
                let name = NAMES[i];
                let url = with_url[i].then(|| report_url(i));
                sources.push(mediated(name, url.as_deref()));
                let behavior = match e {
                    Entry::Load => AdapterBehavior::Load,
                    Entry::NoFill => AdapterBehavior::NoFill,
                    Entry::Construction => AdapterBehavior::FailConstruction("boom".into()),
                    Entry::Unregistered => continue,
                };
                let (net, _) = network(name, behavior, &log);
                networks.push(net);
            }
            let mut builder = HarnessBuilder::new(plan(sources));
            for net in networks {
                builder = builder.network(net);
            }
            let h = builder.build();

            let report = h.run().await;

            let winner = entries.iter().position(|e| matches!(e, Entry::Load));
            let tried = winner.map_or(entries.len(), |w| w + 1);

            let indices: Vec<usize> = report.attempts.iter().map(|a| a.index).collect();
            prop_assert_eq!(indices, (0..tried).collect::<Vec<_>>());
            for (record, e) in report.attempts.iter().zip(&entries) {
                prop_assert_eq!(record.outcome, expected(*e));
                prop_assert_eq!(record.reported, with_url[record.index]);
            }

            let invoked: Vec<String> = log
                .entries()
                .into_iter()
                .filter_map(|l| l.strip_prefix("invoke:").map(str::to_string))
                .collect();
            let expected_invoked: Vec<String> = entries[..tried]
                .iter()
                .enumerate()
                .filter(|(_, e)| !matches!(e, Entry::Unregistered))
                .map(|(i, _)| NAMES[i].to_string())
                .collect();
            prop_assert_eq!(invoked, expected_invoked);

            let reported = (0..tried).filter(|i| with_url[*i]).count();
            prop_assert!(h.reporter.wait_for(reported, SETTLE).await);
            prop_assert_eq!(report.dispatched.len(), reported);

            let events = h.listener.events();
            prop_assert_eq!(events.len(), 1);
            match winner {
                Some(w) => {
                    prop_assert_eq!(report.resolution, CycleResolution::Loaded { index: w });
                    let is_loaded = matches!(events[0], ListenerEvent::Loaded { .. });
                    prop_assert!(is_loaded);
                }
                None => prop_assert_eq!(report.resolution, CycleResolution::NoFill),
            }
            Ok::<(), TestCaseError>(())
        })?;
    }
}
