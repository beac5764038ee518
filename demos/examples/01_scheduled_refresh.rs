use std::time::Duration;

use cascata_demos::common::demo_placement;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    // SlowNet answers within the mediation timeout here and wins each cycle.
    let placement = demo_placement(Duration::from_millis(50), Duration::from_millis(300))?;

    let mut scheduler = placement.scheduler();
    scheduler.start().await;
    tokio::time::sleep(Duration::from_millis(1_000)).await;

    tracing::info!("shortening the refresh period");
    println!("shortening the refresh period");
    scheduler.set_period(Duration::from_millis(100));
    tokio::time::sleep(Duration::from_millis(500)).await;

    scheduler.stop().await;
    println!("cycle scheduler stopped (running={})", scheduler.is_running());
    Ok(())
}
