use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure parsed from `pulse.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PulseConfig {
    /// Where the record stream comes from.
    pub source: SourceConfig,
    /// Analytics tuning: window sizes, redraw rate, idle fallback.
    pub engine: EngineConfig,
    /// Terminal chart settings.
    pub display: DisplayConfig,
}

/// Which source variant feeds the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Tail an appended-to file.
    #[default]
    File,
    /// Poll a line-delimited broker over TCP.
    Broker,
}

/// Source selection and connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub mode: SourceMode,
    /// File to tail in `file` mode.
    pub path: PathBuf,
    /// Broker address in `broker` mode.
    pub addr: String,
    pub topic: String,
    pub group: String,
    /// Bounded wait per poll, also the idle-tick period (milliseconds).
    pub poll_timeout_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            mode:            SourceMode::File,
            path:            PathBuf::from("data/pulse_live.ndjson"),
            addr:            "127.0.0.1:7878".to_string(),
            topic:           "pulse-events".to_string(),
            group:           "pulse".to_string(),
            poll_timeout_ms: 500,
        }
    }
}

/// Analytics tuning for one session. Window capacities are fixed once a
/// session starts; edits to this section take effect via session restart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Rolling-average window size `W`.
    pub rolling_window: usize,
    /// Chart history capacity `H`.
    pub history_size: usize,
    /// Category bar window capacity `B`.
    pub bar_window: usize,
    /// Categories shown in the bar table.
    pub top_n: usize,
    /// Redraw frequency cap (frames per second).
    pub fps: f64,
    /// Seconds of silence before synthetic fallback; `0` disables it.
    pub idle_fallback_secs: f64,
    /// Max rolling-window spread still reported as a plateau.
    pub stall_threshold: f64,
    /// Known category set, used for synthetic samples.
    pub categories: Vec<String>,
    /// Value domain for synthetic samples: `[low, high]`.
    pub value_range: [f64; 2],
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rolling_window:     30,
            history_size:       600,
            bar_window:         200,
            top_n:              5,
            fps:                10.0,
            idle_fallback_secs: 2.0,
            stall_threshold:    0.2,
            categories: [
                "humor",
                "tech",
                "food",
                "travel",
                "entertainment",
                "gaming",
                "other",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            value_range: [0.0, 1.0],
        }
    }
}

/// Terminal chart settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Log every applied sample at info level.
    pub verbose: bool,
    /// Show the newest sample (with its REAL/SYNTH tag) under the chart.
    pub show_last: bool,
    /// Chart width in terminal columns.
    pub width: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            verbose:   true,
            show_last: true,
            width:     72,
        }
    }
}
