use crate::error::PulseError;
use crate::record::RawRecord;

/// All messages that can flow into the ingestion loop.
///
/// Sources:
/// - Source poll task      → `Batch`, `SourceEnded`
/// - Idle ticker           → `Tick`
/// - Config watcher task   → `ConfigReloaded`
/// - Signal handler        → `Shutdown`
#[derive(Debug)]
pub enum Message {
    /// Zero-or-more raw records obtained in one poll of the source.
    Batch(Vec<RawRecord>),
    /// The source is done: `None` = clean exhaustion, `Some` = unavailable.
    SourceEnded(Option<PulseError>),
    /// Poll-interval heartbeat — drives the idle watchdog and keeps the
    /// display responsive when the source is silent.
    Tick,
    /// Config file changed on disk — triggers a clean session restart.
    ConfigReloaded,
    /// Graceful shutdown requested.
    Shutdown,
}
