//! Bounded record of a leader's per-frame velocity samples.

use glam::Vec2;
use std::collections::VecDeque;

/// Newest-first ring of velocity samples.
///
/// Each sample's magnitude is read as the distance the leader covered that
/// frame, so walking the buffer from the front traces the leader's path
/// backwards by arc length.
#[derive(Debug, Clone)]
pub struct TrajectoryHistory {
    samples: VecDeque<Vec2>,
    capacity: usize,
}

impl TrajectoryHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Push this frame's sample to the front, evicting the oldest past capacity.
    pub fn record(&mut self, velocity: Vec2) {
        self.samples.push_front(velocity);
        self.samples.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Most recent sample.
    pub fn latest(&self) -> Option<Vec2> {
        self.samples.front().copied()
    }

    /// Sample `index` frames ago (0 = latest).
    pub fn get(&self, index: usize) -> Option<Vec2> {
        self.samples.get(index).copied()
    }

    /// Samples from newest to oldest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Vec2> + ExactSizeIterator + '_ {
        self.samples.iter().copied()
    }

    /// Sum of all sample magnitudes.
    pub fn arc_length(&self) -> f32 {
        self.samples.iter().map(|s| s.length()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_exceeds_capacity_and_front_is_latest() {
        let mut history = TrajectoryHistory::new(2000);
        for i in 0..5000 {
            history.record(Vec2::new(i as f32, 0.0));
            assert!(history.len() <= 2000);
            assert_eq!(history.latest(), Some(Vec2::new(i as f32, 0.0)));
        }
        assert_eq!(history.len(), 2000);
        // Oldest survivor is the 2000th most recent sample.
        assert_eq!(history.get(1999), Some(Vec2::new(3000.0, 0.0)));
    }

    #[test]
    fn iter_runs_newest_to_oldest() {
        let mut history = TrajectoryHistory::new(4);
        for x in [1.0, 2.0, 3.0] {
            history.record(Vec2::new(x, 0.0));
        }
        let xs: Vec<f32> = history.iter().map(|v| v.x).collect();
        assert_eq!(xs, vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn arc_length_sums_magnitudes() {
        let mut history = TrajectoryHistory::new(8);
        history.record(Vec2::new(3.0, 4.0));
        history.record(Vec2::new(0.0, -2.0));
        assert!((history.arc_length() - 7.0).abs() < 1e-6);
    }
}
