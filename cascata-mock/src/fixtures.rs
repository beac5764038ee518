//! Shorthand constructors for waterfall entries.

use cascata_core::{AdResponse, AdSource, AdapterId, MediatedSource, StandardAd, WaterfallPlan};

/// Default banner width used by fixtures.
pub const WIDTH: u32 = 320;
/// Default banner height used by fixtures.
pub const HEIGHT: u32 = 50;

/// Mediated entry for `adapter` reporting to `report_url`.
#[must_use]
pub fn mediated(adapter: &str, report_url: Option<&str>) -> AdSource {
    AdSource::Mediated(MediatedSource {
        adapter: AdapterId::new(adapter),
        params: Some(format!("unit={adapter}")),
        id: 7,
        width: WIDTH,
        height: HEIGHT,
        report_url: report_url.map(str::to_string),
    })
}

/// Standard entry carrying `content`.
#[must_use]
pub fn standard(content: &str) -> AdSource {
    AdSource::Standard(StandardAd {
        content: content.to_string(),
        width: WIDTH,
        height: HEIGHT,
    })
}

/// Report URL used by fixtures for entry `n`.
#[must_use]
pub fn report_url(n: usize) -> String {
    format!("https://track.example/result?entry={n}")
}

/// Plan built from entries in priority order.
#[must_use]
pub fn plan(entries: Vec<AdSource>) -> WaterfallPlan {
    WaterfallPlan::new(entries)
}

/// Successful ad-response JSON carrying `plan`.
#[must_use]
pub fn response_body(plan: WaterfallPlan) -> String {
    AdResponse::ok(plan).to_json().unwrap_or_default()
}
