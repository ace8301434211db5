use crate::window::BoundedWindow;

/// Label reported by [`FrequencyWindow::top_n`] when the window is empty.
/// Callers must treat it as "no data", not as a real category.
pub const NO_DATA_LABEL: &str = "(none)";

/// Top-N category counts over a sliding window of labels.
///
/// Counts are recomputed from the window contents on every read, so
/// `sum(counts) == len(window)` holds by construction and eviction can never
/// leave a stale count behind.
#[derive(Debug, Clone)]
pub struct FrequencyWindow {
    window: BoundedWindow<String>,
}

impl FrequencyWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            window: BoundedWindow::new(capacity),
        }
    }

    pub fn observe(&mut self, category: impl Into<String>) {
        self.window.push(category.into());
    }

    /// At most `n` `(category, count)` entries, highest count first.
    ///
    /// Ties break by which category appears first in the *current* window
    /// contents — deterministic, independent of any hash order. An empty
    /// window yields the single [`NO_DATA_LABEL`] sentinel with count zero.
    pub fn top_n(&self, n: usize) -> Vec<(String, u64)> {
        if self.window.is_empty() {
            return vec![(NO_DATA_LABEL.to_string(), 0)];
        }

        // First-seen window order; linear scan is fine at bar-window sizes.
        let mut counts: Vec<(String, u64)> = Vec::new();
        for label in self.window.iter() {
            match counts.iter_mut().find(|(l, _)| l == label) {
                Some((_, c)) => *c += 1,
                None => counts.push((label.clone(), 1)),
            }
        }

        // Stable sort keeps first-seen order among equal counts.
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.truncate(n);
        counts
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observe_all(fw: &mut FrequencyWindow, labels: &[&str]) {
        for l in labels {
            fw.observe(*l);
        }
    }

    #[test]
    fn empty_window_yields_sentinel() {
        let fw = FrequencyWindow::new(10);
        assert_eq!(fw.top_n(5), vec![(NO_DATA_LABEL.to_string(), 0)]);
    }

    #[test]
    fn top_n_orders_by_descending_count() {
        let mut fw = FrequencyWindow::new(10);
        observe_all(&mut fw, &["a", "b", "a", "c", "b", "a"]);
        assert_eq!(
            fw.top_n(2),
            vec![("a".to_string(), 3), ("b".to_string(), 2)]
        );
    }

    #[test]
    fn ties_break_by_first_seen_in_window() {
        let mut fw = FrequencyWindow::new(10);
        observe_all(&mut fw, &["x", "y", "x", "y"]);
        assert_eq!(
            fw.top_n(2),
            vec![("x".to_string(), 2), ("y".to_string(), 2)]
        );
    }

    #[test]
    fn tie_break_follows_current_window_not_session_history() {
        // Capacity 3: the first "x" is evicted, so "y" is first-seen now.
        let mut fw = FrequencyWindow::new(3);
        observe_all(&mut fw, &["x", "y", "x", "y"]);
        // Window contents: ["y", "x", "y"] → y=2, x=1.
        assert_eq!(
            fw.top_n(2),
            vec![("y".to_string(), 2), ("x".to_string(), 1)]
        );
    }

    #[test]
    fn counts_always_sum_to_window_len() {
        let mut fw = FrequencyWindow::new(4);
        let stream = ["a", "b", "a", "c", "c", "c", "b", "a"];
        for label in stream {
            fw.observe(label);
            let total: u64 = fw.top_n(usize::MAX).iter().map(|(_, c)| c).sum();
            assert_eq!(total, fw.len() as u64);
        }
    }

    #[test]
    fn truncates_to_n_entries() {
        let mut fw = FrequencyWindow::new(10);
        observe_all(&mut fw, &["a", "b", "c", "d"]);
        assert_eq!(fw.top_n(2).len(), 2);
    }
}
