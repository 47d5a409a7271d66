//! Last-write-wins render scheduling.
//!
//! Every buffer change bumps a generation and (re)arms a deadline. A render
//! started for generation `g` is only applied if no newer change arrived
//! meanwhile. Time is supplied by the caller in milliseconds, so the same
//! code runs under a browser clock and under tests.

#[derive(Debug, Clone)]
pub struct RenderDebounce {
    delay_ms: f64,
    generation: u64,
    deadline: Option<f64>,
}

impl RenderDebounce {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms: delay_ms.max(0.0),
            generation: 0,
            deadline: None,
        }
    }

    /// Register a change at `now_ms`. Any pending render is superseded.
    pub fn schedule(&mut self, now_ms: f64) -> u64 {
        self.generation += 1;
        self.deadline = Some(now_ms + self.delay_ms);
        self.generation
    }

    /// Register a change that should render at the next poll, skipping the
    /// quiet period (initial load, loading a saved file).
    pub fn force(&mut self) -> u64 {
        self.generation += 1;
        self.deadline = Some(f64::NEG_INFINITY);
        self.generation
    }

    /// The generation to render if the quiet period has elapsed.
    ///
    /// Disarms the deadline; a second call returns `None` until the next
    /// [`schedule`](Self::schedule).
    pub fn take_due(&mut self, now_ms: f64) -> Option<u64> {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                Some(self.generation)
            }
            _ => None,
        }
    }

    /// Whether a render started for `generation` is still the latest.
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Milliseconds until the pending render is due, if one is armed.
    pub fn remaining(&self, now_ms: f64) -> Option<f64> {
        self.deadline.map(|d| (d - now_ms).max(0.0))
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_after_quiet_period() {
        let mut d = RenderDebounce::new(300.0);
        let g = d.schedule(1000.0);
        assert_eq!(d.take_due(1299.0), None);
        assert_eq!(d.take_due(1300.0), Some(g));
        assert_eq!(d.take_due(1400.0), None);
    }

    #[test]
    fn later_change_reschedules() {
        let mut d = RenderDebounce::new(300.0);
        let first = d.schedule(0.0);
        let second = d.schedule(200.0);
        assert_eq!(d.take_due(300.0), None);
        assert_eq!(d.take_due(500.0), Some(second));
        assert!(!d.is_current(first));
    }

    #[test]
    fn in_flight_render_goes_stale() {
        let mut d = RenderDebounce::new(300.0);
        d.schedule(0.0);
        let started = d.take_due(300.0).unwrap();
        d.schedule(310.0);
        assert!(!d.is_current(started));
    }

    #[test]
    fn forced_render_is_due_immediately() {
        let mut d = RenderDebounce::new(300.0);
        let g = d.force();
        assert_eq!(d.take_due(0.0), Some(g));
    }

    #[test]
    fn cancel_disarms() {
        let mut d = RenderDebounce::new(300.0);
        d.schedule(0.0);
        d.cancel();
        assert!(!d.is_pending());
        assert_eq!(d.take_due(1000.0), None);
        assert_eq!(d.remaining(0.0), None);
    }
}
