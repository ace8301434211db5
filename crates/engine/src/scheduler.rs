use std::time::{Duration, Instant};

/// Gates redraw requests to a target frequency.
///
/// Sample arrival can be arbitrarily bursty; this keeps the expensive redraw
/// path at no more than `fps` invocations per second. It never *forces* a
/// redraw — an idle loop simply keeps asking.
#[derive(Debug, Clone)]
pub struct RenderScheduler {
    min_interval: Duration,
    last_render: Option<Instant>,
}

impl RenderScheduler {
    pub fn new(fps: f64) -> Self {
        Self {
            min_interval: Duration::from_secs_f64(1.0 / fps.max(1e-6)),
            last_render: None,
        }
    }

    /// True (and the token advances) iff at least `1/fps` has elapsed since
    /// the last granted render. The very first call is always granted.
    pub fn should_render(&mut self, now: Instant) -> bool {
        let due = match self.last_render {
            Some(last) => now.duration_since(last) >= self.min_interval,
            None => true,
        };
        if due {
            self.last_render = Some(now);
        }
        due
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_always_renders() {
        let mut s = RenderScheduler::new(10.0);
        assert!(s.should_render(Instant::now()));
    }

    #[test]
    fn calls_within_interval_are_rejected() {
        let mut s = RenderScheduler::new(10.0); // 100ms interval
        let t0 = Instant::now();
        assert!(s.should_render(t0));
        assert!(!s.should_render(t0 + Duration::from_millis(10)));
        assert!(!s.should_render(t0 + Duration::from_millis(99)));
    }

    #[test]
    fn calls_spaced_at_interval_all_render() {
        let mut s = RenderScheduler::new(10.0);
        let t0 = Instant::now();
        assert!(s.should_render(t0));
        assert!(s.should_render(t0 + Duration::from_millis(100)));
        assert!(s.should_render(t0 + Duration::from_millis(200)));
    }

    #[test]
    fn rejected_call_does_not_advance_the_token() {
        let mut s = RenderScheduler::new(10.0);
        let t0 = Instant::now();
        assert!(s.should_render(t0));
        // Rejected at t+60ms; the token still points at t0, so t+110ms is due.
        assert!(!s.should_render(t0 + Duration::from_millis(60)));
        assert!(s.should_render(t0 + Duration::from_millis(110)));
    }
}
