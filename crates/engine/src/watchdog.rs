use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use pulse_core::Sample;
use rand::{rng, Rng};

/// Tracks time since the last *real* sample.
///
/// Two states: LIVE (a real sample arrived within the threshold) and STALE
/// (silence for at least the threshold). Synthetic samples never reset the
/// clock — only a successfully normalized real sample does. A threshold of
/// zero disables the fallback entirely.
#[derive(Debug, Clone)]
pub struct IdleWatchdog {
    last_real: Instant,
    idle_threshold: Duration,
}

impl IdleWatchdog {
    pub fn new(idle_threshold: Duration, now: Instant) -> Self {
        Self {
            last_real: now,
            idle_threshold,
        }
    }

    /// A real sample was applied — back to LIVE.
    pub fn record_real(&mut self, now: Instant) {
        self.last_real = now;
    }

    /// STALE ⇔ fallback is enabled and no real sample for ≥ the threshold.
    pub fn is_stale(&self, now: Instant) -> bool {
        self.fallback_enabled() && now.duration_since(self.last_real) >= self.idle_threshold
    }

    pub fn fallback_enabled(&self) -> bool {
        !self.idle_threshold.is_zero()
    }

    pub fn idle_threshold(&self) -> Duration {
        self.idle_threshold
    }
}

/// Fabricates plausible samples to keep the pipeline warm while the real
/// source is silent.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    categories: Vec<String>,
    value_range: (f64, f64),
}

impl SyntheticSource {
    pub fn new(categories: Vec<String>, value_range: (f64, f64)) -> Self {
        let categories = if categories.is_empty() {
            vec!["other".to_string()]
        } else {
            categories
        };
        Self {
            categories,
            value_range,
        }
    }

    /// One fabricated sample: uniform value over the configured range, a
    /// random category from the configured set, tagged as synthetic.
    pub fn generate(&self, timestamp: DateTime<Utc>) -> Sample {
        let mut rng = rng();
        let (lo, hi) = self.value_range;
        let value = if hi > lo { rng.random_range(lo..=hi) } else { lo };
        let category = &self.categories[rng.random_range(0..self.categories.len())];
        Sample::synthetic(timestamp, value, category.clone())
    }
}
