use std::time::Duration;

use cascata_demos::common::demo_placement;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Suggested: RUST_LOG=info,cascata=debug
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
        .try_init();

    // SlowNet answers after the 200ms mediation timeout, so the cycle falls
    // through to GoodNet.
    let placement = demo_placement(Duration::from_millis(500), Duration::ZERO)?;
    let report = placement.load_once().await?;

    println!("cycle resolution: {:?}", report.resolution);
    for a in &report.attempts {
        println!("  #{} {:<14} {:?} reported={}", a.index, a.label, a.outcome, a.reported);
    }
    Ok(())
}
