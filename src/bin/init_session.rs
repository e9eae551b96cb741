//! Standalone entry point for first-time login.

use forward_tracker::commands::init_session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();
    init_session::run().await?;
    Ok(())
}
