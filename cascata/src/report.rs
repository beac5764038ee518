use std::sync::Arc;

use cascata_core::{OutcomeReporter, ReportReceipt};
use cascata_types::OutcomeCode;
use tokio::task::JoinHandle;

/// File an outcome report in the background.
///
/// The returned handle resolves to the receipt on success. Failures are logged
/// and resolve to `None`; they never reach the cycle.
pub(crate) fn dispatch(
    reporter: &Arc<dyn OutcomeReporter>,
    template: &str,
    code: OutcomeCode,
) -> JoinHandle<Option<ReportReceipt>> {
    let reporter = Arc::clone(reporter);
    let template = template.to_string();
    tokio::spawn(async move {
        match reporter.report(&template, code).await {
            Ok(receipt) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(url = %receipt.url, status = receipt.status, code = %code, "outcome reported");
                Some(receipt)
            }
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(error = %e, code = %code, "outcome report failed");
                #[cfg(not(feature = "tracing"))]
                let _ = e;
                None
            }
        }
    })
}
