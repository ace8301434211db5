pub mod broker;
pub mod normalize;
pub mod tail;

pub use broker::BrokerSource;
pub use normalize::normalize;
pub use tail::TailSource;

use async_trait::async_trait;
use pulse_core::{RawRecord, Result};
use std::time::Duration;

/// A pull-based record source.
///
/// Both variants (broker socket, file tail) share this seam so the ingestion
/// loop is identical downstream. `poll` waits at most `timeout` and returns
/// zero-or-more raw records; an empty batch is a quiet poll, not an error.
/// A `Source` error means the source is permanently unavailable — the session
/// ends rather than silently retrying forever.
#[async_trait]
pub trait RecordSource: Send {
    async fn poll(&mut self, timeout: Duration) -> Result<Vec<RawRecord>>;

    /// Release the underlying connection/file handle.
    async fn close(&mut self) -> Result<()>;

    /// Human-readable identity for lifecycle logging.
    fn describe(&self) -> String;
}
