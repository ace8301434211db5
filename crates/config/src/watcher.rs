use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// Watches the config file and sends a notification on every write.
///
/// Window capacities are fixed per session, so the runtime reacts to a
/// notification by finishing the current session and starting a fresh one
/// with the new settings — never by mutating windows mid-stream.
///
/// # Example
/// ```no_run
/// # use pulse_config::ConfigWatcher;
/// # async fn example() {
/// let (_, mut rx) = ConfigWatcher::spawn("/home/user/.config/pulse/pulse.toml");
/// while rx.recv().await.is_some() {
///     println!("config changed — restarting session");
/// }
/// # }
/// ```
pub struct ConfigWatcher {
    path: PathBuf,
}

impl ConfigWatcher {
    /// Spawn a filesystem watcher for `path`.
    /// Returns the watcher handle and a receiver that fires on every detected change.
    pub fn spawn(path: impl AsRef<Path>) -> (Self, mpsc::Receiver<()>) {
        let (tx, rx) = mpsc::channel(1);
        let path = path.as_ref().to_path_buf();
        let watcher = Self { path: path.clone() };

        tokio::spawn(watch_loop(path, tx));

        (watcher, rx)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn watch_loop(path: PathBuf, tx: mpsc::Sender<()>) {
    use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
    use std::time::Duration;
    use tokio::sync::mpsc as async_mpsc;

    let (sync_tx, mut sync_rx) = async_mpsc::channel::<notify::Result<Event>>(16);

    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            let _ = sync_tx.blocking_send(res);
        },
        Config::default().with_poll_interval(Duration::from_secs(2)),
    ) {
        Ok(w) => w,
        Err(e) => {
            error!("Failed to create filesystem watcher: {e}");
            return;
        }
    };

    if let Err(e) = watcher.watch(&path, RecursiveMode::NonRecursive) {
        // A missing config file is normal (defaults apply); live reload is
        // simply unavailable until the next start.
        warn!("Not watching '{}': {e}", path.display());
        return;
    }

    info!("Watching config file: {}", path.display());

    // Editors typically fire several write events per save. A reload costs a
    // whole session restart here, so coalesce bursts into one notification.
    const DEBOUNCE: Duration = Duration::from_millis(500);
    let mut last_sent: Option<tokio::time::Instant> = None;

    while let Some(event) = sync_rx.recv().await {
        match event {
            Ok(e) => {
                use notify::EventKind::*;
                if !matches!(e.kind, Modify(_) | Create(_)) {
                    continue;
                }
                let now = tokio::time::Instant::now();
                if last_sent.is_some_and(|t| now.duration_since(t) < DEBOUNCE) {
                    continue;
                }
                last_sent = Some(now);
                if tx.send(()).await.is_err() {
                    break; // receiver dropped
                }
            }
            Err(e) => warn!("Watcher error: {e}"),
        }
    }
}
