//! Bounded history of the disc tip, sampled on a coarser clock than the
//! integrator.

use std::collections::VecDeque;

use na::Point3;

#[derive(Debug, Clone)]
pub struct TrailBuffer {
    samples: VecDeque<Point3<f64>>,
    capacity: usize,
    /// How many trailing samples are exposed for drawing.
    draw_range: usize,
    /// Seconds between two recorded samples.
    interval: f64,
    /// Simulated time since the last recorded sample.
    clock: f64,
}

impl TrailBuffer {
    pub fn new(capacity: usize, interval: f64) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
            draw_range: 0,
            interval,
            clock: 0.0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn draw_range(&self) -> usize {
        self.draw_range
    }

    /// Append a sample, dropping the oldest once over capacity.
    pub fn push(&mut self, sample: Point3<f64>) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Set how many trailing samples `visible` returns. Retention is not
    /// affected.
    pub fn set_draw_range(&mut self, n: usize) {
        self.draw_range = n.min(self.capacity);
    }

    /// Draw range covering `seconds` of history.
    pub fn set_draw_duration(&mut self, seconds: f64) {
        let n = (seconds.max(0.0) / self.interval).round();
        self.set_draw_range(n as usize);
    }

    /// Clear the history down to one seed sample.
    pub fn reset(&mut self, initial: Point3<f64>) {
        self.samples.clear();
        self.samples.push_back(initial);
        self.clock = 0.0;
    }

    /// Advance the sampling clock by `dt` and record `tip` whenever a full
    /// interval has passed.
    pub fn record(&mut self, dt: f64, tip: Point3<f64>) {
        self.clock += dt;
        if self.clock >= self.interval {
            self.clock -= self.interval;
            self.push(tip);
        }
    }

    /// All retained samples, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Point3<f64>> {
        self.samples.iter()
    }

    /// The trailing `draw_range` samples, oldest first.
    pub fn visible(&self) -> impl Iterator<Item = &Point3<f64>> {
        let start = self.samples.len().saturating_sub(self.draw_range);
        self.samples.range(start..)
    }

    pub fn latest(&self) -> Option<&Point3<f64>> {
        self.samples.back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(i: usize) -> Point3<f64> {
        Point3::new(i as f64, 0.0, 0.0)
    }

    #[test]
    fn never_exceeds_capacity_and_evicts_oldest() {
        let mut trail = TrailBuffer::new(5, 0.1);
        for i in 0..23 {
            trail.push(p(i));
            assert!(trail.len() <= 5);
        }
        let kept: Vec<f64> = trail.iter().map(|s| s.x).collect();
        assert_eq!(kept, vec![18.0, 19.0, 20.0, 21.0, 22.0]);
    }

    #[test]
    fn draw_range_only_limits_the_view() {
        let mut trail = TrailBuffer::new(10, 0.1);
        for i in 0..8 {
            trail.push(p(i));
        }
        assert_eq!(trail.visible().count(), 0);

        trail.set_draw_range(3);
        let shown: Vec<f64> = trail.visible().map(|s| s.x).collect();
        assert_eq!(shown, vec![5.0, 6.0, 7.0]);
        assert_eq!(trail.len(), 8);

        trail.set_draw_range(50);
        assert_eq!(trail.draw_range(), 10);
        assert_eq!(trail.visible().count(), 8);
    }

    #[test]
    fn draw_duration_converts_to_samples() {
        let mut trail = TrailBuffer::new(500, 0.02);
        trail.set_draw_duration(2.0);
        assert_eq!(trail.draw_range(), 100);
        trail.set_draw_duration(-1.0);
        assert_eq!(trail.draw_range(), 0);
    }

    #[test]
    fn reset_leaves_single_seed() {
        let mut trail = TrailBuffer::new(4, 0.1);
        for i in 0..4 {
            trail.push(p(i));
        }
        trail.reset(p(99));
        assert_eq!(trail.len(), 1);
        assert_eq!(trail.latest(), Some(&p(99)));
    }

    #[test]
    fn record_samples_on_its_own_clock() {
        let mut trail = TrailBuffer::new(100, 0.25);
        trail.reset(p(0));
        for i in 1..=9 {
            trail.record(0.125, p(i));
        }
        // Every second step completes an interval: 2, 4, 6 and 8, plus the
        // seed. Step 9 is still pending.
        assert_eq!(trail.len(), 5);
        assert_eq!(trail.latest(), Some(&p(8)));
    }
}
