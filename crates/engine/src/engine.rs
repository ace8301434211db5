use std::time::Instant;

use chrono::Utc;
use pulse_core::{ChartSnapshot, LastSample, Sample, SamplePoint};

use crate::frequency::FrequencyWindow;
use crate::rolling::RollingAggregator;
use crate::scheduler::RenderScheduler;
use crate::watchdog::{IdleWatchdog, SyntheticSource};
use crate::window::BoundedWindow;

/// Tuning for one ingestion session. Window capacities are fixed once the
/// engine is built; changing them means restarting the session.
#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Rolling-average window size `W`.
    pub rolling_window: usize,
    /// Chart history capacity `H` (x/y points kept for rendering).
    pub history_size: usize,
    /// Category bar window capacity `B`.
    pub bar_window: usize,
    /// How many categories the top-N table shows.
    pub top_n: usize,
    /// Redraw frequency cap in frames per second.
    pub fps: f64,
    /// Seconds of source silence before synthetic fallback kicks in;
    /// zero disables the fallback.
    pub idle_fallback_secs: f64,
    /// Max rolling-window spread still considered a plateau.
    pub stall_threshold: f64,
    /// Category set used for synthetic samples.
    pub categories: Vec<String>,
    /// Value domain used for synthetic samples.
    pub value_range: (f64, f64),
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            rolling_window: 30,
            history_size: 600,
            bar_window: 200,
            top_n: 5,
            fps: 10.0,
            idle_fallback_secs: 2.0,
            stall_threshold: 0.2,
            categories: default_categories(),
            value_range: (0.0, 1.0),
        }
    }
}

pub(crate) fn default_categories() -> Vec<String> {
    ["humor", "tech", "food", "travel", "entertainment", "gaming", "other"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// The streaming analytics engine for one session.
///
/// Owns every window plus the watchdog and scheduler state — there is no
/// process-global state anywhere. Constructed once per session and dropped on
/// restart, which is also how windows get resized.
#[derive(Debug)]
pub struct Engine {
    history: BoundedWindow<Sample>,
    avg_series: BoundedWindow<SamplePoint>,
    rolling: RollingAggregator,
    frequency: FrequencyWindow,
    watchdog: IdleWatchdog,
    scheduler: RenderScheduler,
    synthetic: SyntheticSource,
    top_n: usize,
    stall_threshold: f64,
    applied: u64,
    dropped: u64,
    synthetic_count: u64,
}

impl Engine {
    /// Build a fresh engine with empty windows. `now` seeds the idle clock so
    /// a silent source trips the watchdog one threshold after startup.
    pub fn new(settings: &EngineSettings, now: Instant) -> Self {
        Self {
            history: BoundedWindow::new(settings.history_size),
            avg_series: BoundedWindow::new(settings.history_size),
            rolling: RollingAggregator::new(settings.rolling_window),
            frequency: FrequencyWindow::new(settings.bar_window),
            watchdog: IdleWatchdog::new(
                std::time::Duration::from_secs_f64(settings.idle_fallback_secs.max(0.0)),
                now,
            ),
            scheduler: RenderScheduler::new(settings.fps),
            synthetic: SyntheticSource::new(settings.categories.clone(), settings.value_range),
            top_n: settings.top_n,
            stall_threshold: settings.stall_threshold,
            applied: 0,
            dropped: 0,
            synthetic_count: 0,
        }
    }

    /// Feed one sample through every window and return the rolling average.
    ///
    /// Real samples reset the idle watchdog; synthetic ones deliberately do
    /// not, so the fallback keeps firing until the source actually resumes.
    pub fn apply(&mut self, sample: Sample, now: Instant) -> f64 {
        let avg = self.rolling.observe(sample.value);
        self.avg_series.push(SamplePoint {
            timestamp: sample.timestamp,
            value: avg,
        });
        self.frequency.observe(sample.category.clone());

        if sample.is_synthetic() {
            self.synthetic_count += 1;
        } else {
            self.watchdog.record_real(now);
        }
        self.applied += 1;
        self.history.push(sample);
        avg
    }

    /// Called on iterations that yielded no real records. If the source has
    /// been silent past the idle threshold (and fallback is enabled), one
    /// synthetic sample is generated, applied, and returned.
    pub fn poll_idle(&mut self, now: Instant) -> Option<Sample> {
        if !self.watchdog.is_stale(now) {
            return None;
        }
        let sample = self.synthetic.generate(Utc::now());
        self.apply(sample.clone(), now);
        Some(sample)
    }

    /// A record failed normalization and was dropped.
    pub fn record_dropped(&mut self) {
        self.dropped += 1;
    }

    /// Rate-limit gate for the redraw path.
    pub fn should_render(&mut self, now: Instant) -> bool {
        self.scheduler.should_render(now)
    }

    /// Consistent copy of the current windows for the renderer. The renderer
    /// never sees live engine state, so it can't observe a window mid-push.
    pub fn snapshot(&self) -> ChartSnapshot {
        ChartSnapshot {
            history: self
                .history
                .iter()
                .map(|s| SamplePoint {
                    timestamp: s.timestamp,
                    value: s.value,
                })
                .collect(),
            rolling_avg: self.avg_series.contents(),
            current_avg: self.rolling.average(),
            stalled: self.rolling.is_stalled(self.stall_threshold),
            top_categories: self.frequency.top_n(self.top_n),
            last: self.history.back().map(|s| LastSample {
                timestamp: s.timestamp,
                value: s.value,
                category: s.category.clone(),
                kind: s.kind,
            }),
            applied: self.applied,
            dropped: self.dropped,
            synthetic: self.synthetic_count,
        }
    }

    pub fn applied(&self) -> u64 {
        self.applied
    }

    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}
