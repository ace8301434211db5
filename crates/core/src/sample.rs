use chrono::{DateTime, Utc};

/// Whether a sample came off the wire or was fabricated by the idle fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleKind {
    #[default]
    Real,
    Synthetic,
}

impl SampleKind {
    /// Short tag used in logs and the last-sample chart overlay.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Real => "REAL",
            Self::Synthetic => "SYNTH",
        }
    }
}

/// One normalized event record. Immutable once constructed.
///
/// Produced by the normalizer (real records) or the synthetic fallback source,
/// consumed by the rolling aggregator and the frequency window.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    pub category: String,
    pub kind: SampleKind,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, value: f64, category: impl Into<String>) -> Self {
        Self {
            timestamp,
            value,
            category: category.into(),
            kind: SampleKind::Real,
        }
    }

    /// Same as [`Sample::new`] but tagged as fabricated.
    pub fn synthetic(timestamp: DateTime<Utc>, value: f64, category: impl Into<String>) -> Self {
        Self {
            timestamp,
            value,
            category: category.into(),
            kind: SampleKind::Synthetic,
        }
    }

    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.kind == SampleKind::Synthetic
    }
}
