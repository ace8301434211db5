use std::time::Duration;

use pulse_core::{PulseError, RawRecord, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::TcpStream;
use tokio::time::{timeout, Instant};
use tracing::{debug, info};

/// Pull-based client for a line-delimited message broker.
///
/// Connects over TCP, subscribes with a single `subscribe <topic> <group>`
/// command line, and from then on every line the broker pushes is one opaque
/// record payload. Offsets are assigned locally in arrival order and are only
/// used for logging.
pub struct BrokerSource {
    lines: Lines<BufReader<TcpStream>>,
    addr: String,
    topic: String,
    offset: u64,
    closed: bool,
}

impl BrokerSource {
    /// Connect and subscribe. A refused or unreachable broker is fatal for
    /// this source variant — there is no silent retry loop.
    pub async fn connect(addr: &str, topic: &str, group: &str) -> Result<Self> {
        let mut stream = TcpStream::connect(addr)
            .await
            .map_err(|e| PulseError::Source(format!("cannot connect to broker '{addr}': {e}")))?;

        stream
            .write_all(format!("subscribe {topic} {group}\n").as_bytes())
            .await
            .map_err(|e| PulseError::Source(format!("subscribe failed: {e}")))?;

        info!("Connected to broker {addr}, topic '{topic}', group '{group}'");

        Ok(Self {
            lines: BufReader::new(stream).lines(),
            addr: addr.to_string(),
            topic: topic.to_string(),
            offset: 0,
            closed: false,
        })
    }

    /// Drain complete lines until `deadline`, without waiting once at least
    /// one record is buffered and the wire goes quiet.
    async fn drain_until(&mut self, deadline: Instant) -> Result<Vec<RawRecord>> {
        // Once a record arrived, wait at most this long for a follow-up
        // before handing the batch over.
        const QUIET_GAP: Duration = Duration::from_millis(10);

        let mut batch = Vec::new();

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok(batch);
            }
            let wait = if batch.is_empty() {
                remaining
            } else {
                remaining.min(QUIET_GAP)
            };

            match timeout(wait, self.lines.next_line()).await {
                // Deadline hit — return whatever arrived this poll.
                Err(_) => return Ok(batch),
                Ok(Ok(Some(line))) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    self.offset += 1;
                    debug!(offset = self.offset, "broker record received");
                    batch.push(RawRecord::bytes(line.into_bytes()).with_offset(self.offset));
                }
                Ok(Ok(None)) => {
                    // Broker closed the stream. Deliver what we have; the
                    // next poll reports the source as gone.
                    self.closed = true;
                    if batch.is_empty() {
                        return Err(PulseError::Source(format!(
                            "broker '{}' closed the connection",
                            self.addr
                        )));
                    }
                    return Ok(batch);
                }
                Ok(Err(e)) => {
                    self.closed = true;
                    return Err(PulseError::Source(format!("broker read failed: {e}")));
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl super::RecordSource for BrokerSource {
    async fn poll(&mut self, poll_timeout: Duration) -> Result<Vec<RawRecord>> {
        if self.closed {
            return Err(PulseError::Source(format!(
                "broker '{}' closed the connection",
                self.addr
            )));
        }
        self.drain_until(Instant::now() + poll_timeout).await
    }

    async fn close(&mut self) -> Result<()> {
        if !self.closed {
            self.closed = true;
            let _ = self.lines.get_mut().get_mut().shutdown().await;
            info!("Broker connection to {} closed", self.addr);
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("broker {} topic '{}'", self.addr, self.topic)
    }
}
