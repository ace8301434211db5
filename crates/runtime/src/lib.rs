//! Session orchestration for `pulse`.
//!
//! Wires together all moving parts around the analytics engine:
//! - a background source task polling the broker or tailed file
//! - the ingestion loop feeding the engine and the rate-limited renderer
//! - the config file watcher (a change restarts the session cleanly)
//! - the Ctrl-C shutdown signal

use std::time::{Duration, Instant};

use pulse_config::{ConfigWatcher, PulseConfig, SourceMode};
use pulse_core::{Message, Result};
use pulse_engine::{Engine, EngineSettings};
use pulse_render::{Renderer, TermRenderer};
use pulse_sources::{normalize, BrokerSource, RecordSource, TailSource};
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Stop signal received, or the source is cleanly exhausted.
    Shutdown,
    /// Config changed on disk — build a fresh engine and go again.
    Restart,
}

/// Run the consumer until shutdown. Never returns under normal streaming.
pub async fn run() -> Result<()> {
    let config_path = pulse_config::default_path();
    let (_watcher, mut reload_rx) = ConfigWatcher::spawn(&config_path);

    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown requested");
            let _ = shutdown_tx.send(true);
        }
    });

    loop {
        let mut config = pulse_config::load(&config_path)?;
        pulse_config::overlay_env(&mut config);
        pulse_config::validate(&config)?;

        let mut renderer = TermRenderer::new(config.display.width, config.display.show_last);
        let source = build_source(&config).await?;

        match run_session(&config, source, &mut renderer, &mut reload_rx, &mut shutdown_rx).await? {
            SessionEnd::Restart => {
                info!("Config changed — restarting session with fresh windows");
            }
            SessionEnd::Shutdown => return Ok(()),
        }
    }
}

/// Open the configured source variant. Unavailability is fatal here — the
/// caller reports it instead of hanging in a silent retry loop.
pub async fn build_source(config: &PulseConfig) -> Result<Box<dyn RecordSource>> {
    let source: Box<dyn RecordSource> = match config.source.mode {
        SourceMode::Broker => Box::new(
            BrokerSource::connect(
                &config.source.addr,
                &config.source.topic,
                &config.source.group,
            )
            .await?,
        ),
        SourceMode::File => Box::new(TailSource::open(&config.source.path).await?),
    };
    info!("Consuming from {}", source.describe());
    Ok(source)
}

/// Map the config section onto engine tuning.
pub fn engine_settings(config: &PulseConfig) -> EngineSettings {
    let engine = &config.engine;
    EngineSettings {
        rolling_window: engine.rolling_window,
        history_size: engine.history_size,
        bar_window: engine.bar_window,
        top_n: engine.top_n,
        fps: engine.fps,
        idle_fallback_secs: engine.idle_fallback_secs,
        stall_threshold: engine.stall_threshold,
        categories: engine.categories.clone(),
        value_range: (engine.value_range[0], engine.value_range[1]),
    }
}

/// One ingestion session: a fresh engine consuming one source until the
/// session ends. Windows live and die with this call.
pub async fn run_session(
    config: &PulseConfig,
    source: Box<dyn RecordSource>,
    renderer: &mut dyn Renderer,
    reload_rx: &mut mpsc::Receiver<()>,
    shutdown_rx: &mut watch::Receiver<bool>,
) -> Result<SessionEnd> {
    let poll_timeout = Duration::from_millis(config.source.poll_timeout_ms);
    let verbose = config.display.verbose;

    let mut engine = Engine::new(&engine_settings(config), Instant::now());
    let mut batches = spawn_source(source, poll_timeout);

    let mut ticker = tokio::time::interval(poll_timeout);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut reload_open = true;

    loop {
        let message = tokio::select! {
            // Real records always win over a concurrent tick: a synthetic
            // sample must never jump ahead of a batch already obtained.
            biased;

            maybe = batches.recv() => maybe.unwrap_or(Message::SourceEnded(None)),
            changed = shutdown_rx.changed() => {
                // A dropped sender counts as a stop signal too.
                if changed.is_err() || *shutdown_rx.borrow() {
                    Message::Shutdown
                } else {
                    continue;
                }
            }
            maybe = reload_rx.recv(), if reload_open => match maybe {
                Some(()) => Message::ConfigReloaded,
                None => {
                    reload_open = false;
                    continue;
                }
            },
            _ = ticker.tick() => Message::Tick,
        };

        match message {
            Message::Batch(records) => {
                let now = Instant::now();
                for record in records {
                    match normalize(&record) {
                        Ok(sample) => {
                            if verbose {
                                info!(
                                    "{} {} | {:<14} | value={:.2}",
                                    sample.kind.tag(),
                                    sample.timestamp.format("%Y-%m-%d %H:%M:%S"),
                                    sample.category,
                                    sample.value,
                                );
                            }
                            engine.apply(sample, now);
                        }
                        Err(e) => {
                            debug!(offset = record.offset, "record dropped: {e}");
                            engine.record_dropped();
                        }
                    }
                }
            }
            Message::Tick => {
                if let Some(sample) = engine.poll_idle(Instant::now()) {
                    debug!(
                        "idle fallback: {} {} value={:.2}",
                        sample.kind.tag(),
                        sample.category,
                        sample.value,
                    );
                }
            }
            Message::SourceEnded(None) => {
                info!("Source exhausted; ending session");
                return Ok(SessionEnd::Shutdown);
            }
            Message::SourceEnded(Some(e)) => return Err(e),
            Message::ConfigReloaded => return Ok(SessionEnd::Restart),
            Message::Shutdown => return Ok(SessionEnd::Shutdown),
        }

        if engine.should_render(Instant::now()) {
            if let Err(e) = renderer.render(&engine.snapshot()) {
                warn!("Render failed — skipping this frame: {e}");
            }
        }
    }
}

/// Spawn a background task that polls the source and forwards batches.
///
/// The task stops when the session drops the receiver (and closes the source
/// on the way out), so every session exit path releases the handle.
fn spawn_source(
    mut source: Box<dyn RecordSource>,
    poll_timeout: Duration,
) -> mpsc::Receiver<Message> {
    let (tx, rx) = mpsc::channel(4);

    tokio::spawn(async move {
        loop {
            match source.poll(poll_timeout).await {
                Ok(batch) => {
                    if batch.is_empty() {
                        continue; // quiet poll; the session ticker covers idle work
                    }
                    if tx.send(Message::Batch(batch)).await.is_err() {
                        break; // session ended
                    }
                }
                Err(e) => {
                    let _ = tx.send(Message::SourceEnded(Some(e))).await;
                    break;
                }
            }
        }
        if let Err(e) = source.close().await {
            warn!("Source close failed: {e}");
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pulse_core::{PulseError, RawRecord};
    use pulse_render::CaptureRenderer;
    use std::collections::VecDeque;

    /// Source that replays scripted poll results, then reports unavailability.
    struct ScriptedSource {
        batches: VecDeque<Vec<RawRecord>>,
        exhausted_error: bool,
    }

    impl ScriptedSource {
        fn new(batches: Vec<Vec<RawRecord>>) -> Self {
            Self {
                batches: batches.into(),
                exhausted_error: true,
            }
        }
    }

    #[async_trait]
    impl RecordSource for ScriptedSource {
        async fn poll(&mut self, timeout: Duration) -> Result<Vec<RawRecord>> {
            match self.batches.pop_front() {
                Some(batch) => {
                    // Space batches out so each one lands in its own loop
                    // iteration (and render window).
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    Ok(batch)
                }
                None if self.exhausted_error => {
                    Err(PulseError::Source("scripted source drained".into()))
                }
                None => {
                    tokio::time::sleep(timeout).await;
                    Ok(Vec::new())
                }
            }
        }

        async fn close(&mut self) -> Result<()> {
            Ok(())
        }

        fn describe(&self) -> String {
            "scripted source".to_string()
        }
    }

    fn record(json: &str) -> RawRecord {
        RawRecord::text(json)
    }

    fn test_config() -> PulseConfig {
        let mut config = PulseConfig::default();
        config.source.poll_timeout_ms = 20;
        config.engine.rolling_window = 3;
        config.engine.history_size = 10;
        config.engine.bar_window = 10;
        config.engine.idle_fallback_secs = 0.0;
        config.engine.fps = 1000.0;
        config.display.verbose = false;
        config
    }

    fn channels() -> (
        mpsc::Sender<()>,
        mpsc::Receiver<()>,
        watch::Sender<bool>,
        watch::Receiver<bool>,
    ) {
        let (reload_tx, reload_rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        (reload_tx, reload_rx, shutdown_tx, shutdown_rx)
    }

    #[tokio::test]
    async fn session_applies_records_and_ends_on_source_loss() {
        let source = ScriptedSource::new(vec![
            vec![
                record(r#"{"timestamp": "2025-01-11T18:15:00Z", "value": 0.2, "category": "tech"}"#),
                record(r#"{"timestamp": "2025-01-11T18:15:01Z", "value": 0.4, "category": "tech"}"#),
            ],
            vec![record("{definitely not json")],
        ]);
        let mut renderer = CaptureRenderer::new();
        let (_reload_tx, mut reload_rx, _shutdown_tx, mut shutdown_rx) = channels();

        let result = run_session(
            &test_config(),
            Box::new(source),
            &mut renderer,
            &mut reload_rx,
            &mut shutdown_rx,
        )
        .await;

        assert!(matches!(result, Err(PulseError::Source(_))));

        let last = renderer.last().expect("at least one frame rendered");
        assert_eq!(last.applied, 2);
        assert_eq!(last.dropped, 1);
        assert_eq!(last.top_categories[0], ("tech".to_string(), 2));
        // Records were applied in normalization order.
        let values: Vec<f64> = last.history.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![0.2, 0.4]);
    }

    #[tokio::test]
    async fn shutdown_signal_stops_the_session_promptly() {
        let mut source = ScriptedSource::new(Vec::new());
        source.exhausted_error = false; // idle forever
        let mut renderer = CaptureRenderer::new();
        let (_reload_tx, mut reload_rx, shutdown_tx, mut shutdown_rx) = channels();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            let _ = shutdown_tx.send(true);
        });

        let result = tokio::time::timeout(
            Duration::from_millis(500),
            run_session(
                &test_config(),
                Box::new(source),
                &mut renderer,
                &mut reload_rx,
                &mut shutdown_rx,
            ),
        )
        .await
        .expect("session must stop within one polling interval of the signal");

        assert_eq!(result.unwrap(), SessionEnd::Shutdown);
    }

    #[tokio::test]
    async fn config_change_requests_a_restart() {
        let mut source = ScriptedSource::new(Vec::new());
        source.exhausted_error = false;
        let mut renderer = CaptureRenderer::new();
        let (reload_tx, mut reload_rx, _shutdown_tx, mut shutdown_rx) = channels();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            let _ = reload_tx.send(()).await;
        });

        let result = tokio::time::timeout(
            Duration::from_millis(500),
            run_session(
                &test_config(),
                Box::new(source),
                &mut renderer,
                &mut reload_rx,
                &mut shutdown_rx,
            ),
        )
        .await
        .expect("session must notice the reload");

        assert_eq!(result.unwrap(), SessionEnd::Restart);
    }

    #[tokio::test]
    async fn idle_source_triggers_synthetic_fallback() {
        let mut source = ScriptedSource::new(Vec::new());
        source.exhausted_error = false;
        let mut renderer = CaptureRenderer::new();
        let (_reload_tx, mut reload_rx, shutdown_tx, mut shutdown_rx) = channels();

        let mut config = test_config();
        config.engine.idle_fallback_secs = 0.05;
        config.source.poll_timeout_ms = 10;

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            let _ = shutdown_tx.send(true);
        });

        run_session(
            &config,
            Box::new(source),
            &mut renderer,
            &mut reload_rx,
            &mut shutdown_rx,
        )
        .await
        .unwrap();

        let last = renderer.last().expect("idle ticks still render frames");
        assert!(last.synthetic >= 1, "expected at least one synthetic sample");
        assert_eq!(last.applied, last.synthetic);
    }

    #[tokio::test]
    async fn disabled_fallback_stays_quiet_while_idle() {
        let mut source = ScriptedSource::new(Vec::new());
        source.exhausted_error = false;
        let mut renderer = CaptureRenderer::new();
        let (_reload_tx, mut reload_rx, shutdown_tx, mut shutdown_rx) = channels();

        let config = test_config(); // idle_fallback_secs = 0.0

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            let _ = shutdown_tx.send(true);
        });

        run_session(
            &config,
            Box::new(source),
            &mut renderer,
            &mut reload_rx,
            &mut shutdown_rx,
        )
        .await
        .unwrap();

        if let Some(last) = renderer.last() {
            assert_eq!(last.applied, 0);
            assert_eq!(last.synthetic, 0);
        }
    }

    #[test]
    fn engine_settings_mirror_the_config_section() {
        let mut config = PulseConfig::default();
        config.engine.rolling_window = 7;
        config.engine.value_range = [1.0, 9.0];
        let settings = engine_settings(&config);
        assert_eq!(settings.rolling_window, 7);
        assert_eq!(settings.value_range, (1.0, 9.0));
        assert_eq!(settings.top_n, config.engine.top_n);
    }
}
