use chrono::{DateTime, Utc};

use crate::sample::SampleKind;

/// One point of the rendered time series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplePoint {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Consistent copy of the engine's current windows, handed to the renderer.
///
/// The renderer never reads engine state directly — it gets this owned
/// snapshot, so a redraw can never observe a window mid-mutation.
#[derive(Debug, Clone, Default)]
pub struct ChartSnapshot {
    /// Raw value series, oldest → newest (capacity `history_size`).
    pub history: Vec<SamplePoint>,
    /// Rolling-average series aligned with `history`.
    pub rolling_avg: Vec<SamplePoint>,
    /// Mean over the current rolling window; `None` until the first sample.
    pub current_avg: Option<f64>,
    /// Plateau detector verdict over the full rolling window.
    pub stalled: bool,
    /// Top categories over the bar window, descending count. The sentinel
    /// `("(none)", 0)` entry means "no data yet".
    pub top_categories: Vec<(String, u64)>,
    /// Most recently applied sample, for the chart overlay.
    pub last: Option<LastSample>,
    /// Samples applied to the windows this session.
    pub applied: u64,
    /// Records dropped by the normalizer this session.
    pub dropped: u64,
    /// Fabricated samples injected by the idle fallback this session.
    pub synthetic: u64,
}

/// Overlay info about the newest applied sample.
#[derive(Debug, Clone, PartialEq)]
pub struct LastSample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub category: String,
    pub kind: SampleKind,
}

impl ChartSnapshot {
    /// True before any sample (real or synthetic) has been applied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
