use std::path::{Path, PathBuf};
use std::time::Duration;

use pulse_core::{PulseError, RawRecord, Result};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader, Lines, SeekFrom};
use tokio::time::{sleep, Instant};
use tracing::info;

/// How long to wait before re-checking the file for appended lines.
const RECHECK_INTERVAL: Duration = Duration::from_millis(50);

/// Tails a file some producer keeps appending to.
///
/// The read position starts at the current end of file, so only records
/// appended after startup are ever seen. A missing file is fatal — start the
/// producer first or fix the path.
pub struct TailSource {
    lines: Lines<BufReader<File>>,
    path: PathBuf,
    offset: u64,
}

impl TailSource {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::open(&path).await.map_err(|e| {
            PulseError::Source(format!("cannot open '{}': {e}", path.display()))
        })?;

        file.seek(SeekFrom::End(0))
            .await
            .map_err(|e| PulseError::Source(format!("seek failed: {e}")))?;

        info!("Tailing {} from end of file", path.display());

        Ok(Self {
            lines: BufReader::new(file).lines(),
            path,
            offset: 0,
        })
    }
}

#[async_trait::async_trait]
impl super::RecordSource for TailSource {
    async fn poll(&mut self, poll_timeout: Duration) -> Result<Vec<RawRecord>> {
        let deadline = Instant::now() + poll_timeout;
        let mut batch = Vec::new();

        loop {
            match self.lines.next_line().await {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    self.offset += 1;
                    batch.push(RawRecord::text(line).with_offset(self.offset));
                }
                Ok(None) => {
                    // Caught up with the writer. Hand over anything already
                    // collected; otherwise sleep briefly and re-check until
                    // the deadline — appended data shows up as new lines.
                    if !batch.is_empty() || Instant::now() + RECHECK_INTERVAL >= deadline {
                        return Ok(batch);
                    }
                    sleep(RECHECK_INTERVAL).await;
                }
                Err(e) => {
                    return Err(PulseError::Source(format!(
                        "read from '{}' failed: {e}",
                        self.path.display()
                    )));
                }
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        // The handle is owned and dropped with the source; nothing to flush.
        info!("Stopped tailing {}", self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        format!("file tail {}", self.path.display())
    }
}
