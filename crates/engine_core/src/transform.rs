//! Transform component for top-down world positioning.

use glam::Vec2;

/// Position of a vehicle on the track plane.
///
/// World axes follow screen convention: +X is right, +Y is down. Vehicles are
/// point masses, so there is no rotation or scale.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    pub position: Vec2,
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec2) -> Self {
        Self { position }
    }

    /// Advance the position by `velocity * dt`.
    pub fn integrate(&mut self, velocity: Vec2, dt: f32) {
        self.position += velocity * dt;
    }

    /// Whether `other` lies strictly inside the axis-aligned box of the given
    /// half-extent centred on this transform. Each axis is tested on its own.
    pub fn within_box(&self, other: Vec2, half_extent: f32) -> bool {
        let delta = (other - self.position).abs();
        delta.x < half_extent && delta.y < half_extent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrate_moves_by_velocity_times_dt() {
        let mut t = Transform::from_position(Vec2::new(1.0, 2.0));
        t.integrate(Vec2::new(60.0, -30.0), 0.5);
        assert_eq!(t.position, Vec2::new(31.0, -13.0));
    }

    #[test]
    fn within_box_tests_each_axis_independently() {
        let t = Transform::default();
        assert!(t.within_box(Vec2::new(15.0, -15.0), 16.0));
        // Euclidean distance is ~21 but both axes are inside the box.
        assert!(t.within_box(Vec2::new(15.9, 15.9), 16.0));
        assert!(!t.within_box(Vec2::new(16.0, 0.0), 16.0));
        assert!(!t.within_box(Vec2::new(0.0, -20.0), 16.0));
    }
}
