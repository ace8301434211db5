use crate::window::BoundedWindow;

/// Rolling average plus a plateau detector over the most recent values.
///
/// The stall predicate is a plain max−min range check: the window is stalled
/// when it is full and its whole spread fits inside the threshold.
#[derive(Debug, Clone)]
pub struct RollingAggregator {
    window: BoundedWindow<f64>,
}

impl RollingAggregator {
    pub fn new(window_size: usize) -> Self {
        Self {
            window: BoundedWindow::new(window_size),
        }
    }

    /// Push a value and return the mean over the current window contents
    /// (1..=W elements while warming up).
    pub fn observe(&mut self, value: f64) -> f64 {
        self.window.push(value);
        self.mean()
    }

    /// Mean over the current contents; `None` when no value has arrived yet.
    pub fn average(&self) -> Option<f64> {
        if self.window.is_empty() {
            None
        } else {
            Some(self.mean())
        }
    }

    /// Plateau check. Only defined on a full window — a partially warmed
    /// window is "insufficient data", never a stall.
    pub fn is_stalled(&self, threshold: f64) -> bool {
        if !self.window.is_full() {
            return false;
        }
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in self.window.iter() {
            min = min.min(v);
            max = max.max(v);
        }
        (max - min) <= threshold
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn window_size(&self) -> usize {
        self.window.capacity()
    }

    fn mean(&self) -> f64 {
        let sum: f64 = self.window.iter().sum();
        sum / self.window.len() as f64
    }
}
