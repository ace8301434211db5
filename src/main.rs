//! pulse — live streaming insights for timestamped event records.
//!
//! Run with:  `RUST_LOG=info pulse`

use anyhow::Result;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Structured logging — RUST_LOG controls verbosity (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("pulse v{} starting", env!("CARGO_PKG_VERSION"));

    pulse_runtime::run().await.map_err(Into::into)
}
