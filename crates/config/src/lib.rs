pub mod schema;
pub mod watcher;

pub use schema::{DisplayConfig, EngineConfig, PulseConfig, SourceConfig, SourceMode};
pub use watcher::ConfigWatcher;

use pulse_core::{PulseError, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Load configuration from a TOML file.  Returns `PulseConfig::default()` if
/// the file doesn't exist so the consumer always has sensible defaults.
pub fn load(path: impl AsRef<Path>) -> Result<PulseConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(PulseConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| PulseError::Config(format!("cannot read '{}': {e}", path.display())))?;

    toml::from_str(&raw).map_err(|e| PulseError::Config(format!("TOML parse error: {e}")))
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("pulse").join("pulse.toml")
}

/// Overlay `PULSE_*` environment variables onto a loaded config.
///
/// Containerised deployments tune these knobs through the environment rather
/// than the TOML file. Unparsable values are ignored, keeping the file or
/// default value.
pub fn overlay_env(config: &mut PulseConfig) {
    if let Some(mode) = env_str("PULSE_MODE") {
        match mode.to_ascii_lowercase().as_str() {
            "file" => config.source.mode = SourceMode::File,
            "broker" => config.source.mode = SourceMode::Broker,
            other => tracing::warn!("PULSE_MODE '{other}' is not 'file' or 'broker'; ignored"),
        }
    }
    if let Some(path) = env_str("PULSE_DATA_FILE") {
        config.source.path = PathBuf::from(path);
    }
    if let Some(addr) = env_str("PULSE_BROKER_ADDR") {
        config.source.addr = addr;
    }
    if let Some(topic) = env_str("PULSE_TOPIC") {
        config.source.topic = topic;
    }
    if let Some(group) = env_str("PULSE_GROUP") {
        config.source.group = group;
    }

    overlay(&mut config.source.poll_timeout_ms, "PULSE_POLL_TIMEOUT_MS");
    overlay(&mut config.engine.rolling_window, "PULSE_ROLLING_WINDOW");
    overlay(&mut config.engine.history_size, "PULSE_HISTORY_SIZE");
    overlay(&mut config.engine.bar_window, "PULSE_BAR_WINDOW");
    overlay(&mut config.engine.top_n, "PULSE_TOP_N");
    overlay(&mut config.engine.fps, "PULSE_FPS");
    overlay(&mut config.engine.idle_fallback_secs, "PULSE_IDLE_FALLBACK_SECS");
    overlay(&mut config.engine.stall_threshold, "PULSE_STALL_THRESHOLD");

    // Accept 0/1 as well as true/false.
    if let Some(raw) = env_str("PULSE_VERBOSE") {
        match raw.as_str() {
            "1" | "true" => config.display.verbose = true,
            "0" | "false" => config.display.verbose = false,
            other => tracing::warn!("PULSE_VERBOSE '{other}' is not 0/1/true/false; ignored"),
        }
    }
}

/// Reject configurations the engine cannot run with.
pub fn validate(config: &PulseConfig) -> Result<()> {
    let engine = &config.engine;
    if engine.rolling_window == 0 || engine.history_size == 0 || engine.bar_window == 0 {
        return Err(PulseError::Config(
            "window sizes (rolling_window, history_size, bar_window) must be at least 1".into(),
        ));
    }
    if engine.top_n == 0 {
        return Err(PulseError::Config("top_n must be at least 1".into()));
    }
    if engine.fps <= 0.0 {
        return Err(PulseError::Config("fps must be positive".into()));
    }
    if engine.idle_fallback_secs < 0.0 {
        return Err(PulseError::Config("idle_fallback_secs cannot be negative".into()));
    }
    if engine.value_range[0] > engine.value_range[1] {
        return Err(PulseError::Config("value_range low exceeds high".into()));
    }
    if config.source.poll_timeout_ms == 0 {
        return Err(PulseError::Config("poll_timeout_ms must be at least 1".into()));
    }
    Ok(())
}

fn env_str(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn overlay<T: FromStr>(slot: &mut T, key: &str) {
    if let Some(raw) = env_str(key) {
        match raw.parse() {
            Ok(value) => *slot = value,
            Err(_) => tracing::warn!("{key}={raw:?} is not valid; keeping configured value"),
        }
    }
}
