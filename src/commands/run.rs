//! End-to-end pipeline command: refresh all channel logs, then
//! aggregate forward sources from them.

use tracing::info;

use crate::commands::log_channel;
use crate::commands::sources::{self, SourcesOptions, SourcesReport};
use crate::error::Result;

/// Log every configured channel (overwriting existing logs), then build
/// the forward source report from the files just written.
pub async fn run(limit: Option<usize>) -> Result<SourcesReport> {
    info!("Refreshing channel logs...");
    let summary = log_channel::run(None, Some(true), limit).await?;
    info!(
        "Logs refreshed: {} written, {} kept, {} unreachable",
        summary.written, summary.kept, summary.unreachable
    );

    // The logging pass holds the session lock until it returns, so the
    // aggregation pass runs offline against the files it produced
    info!("Aggregating forward sources...");
    sources::run(SourcesOptions {
        offline: true,
        ..Default::default()
    })
    .await
}
