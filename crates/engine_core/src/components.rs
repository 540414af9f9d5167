//! Common ECS components used across the engine.

use glam::Vec2;

/// Velocity component for moving entities (units per second).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity {
    pub linear: Vec2,
}

/// Visual marker for a vehicle. Owned by rendering; physics only copies it
/// from a leader onto the followers it picks up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Livery(pub u32);

/// Snapshot of the four directional controls held by one player this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionalInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl DirectionalInput {
    /// No controls held.
    pub const NONE: Self = Self {
        up: false,
        down: false,
        left: false,
        right: false,
    };

    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }

    /// Net direction in screen axes (up is -Y). Not normalized; opposite
    /// controls cancel to zero on their axis.
    pub fn axis(&self) -> Vec2 {
        let mut axis = Vec2::ZERO;
        if self.up {
            axis.y -= 1.0;
        }
        if self.down {
            axis.y += 1.0;
        }
        if self.left {
            axis.x -= 1.0;
        }
        if self.right {
            axis.x += 1.0;
        }
        axis
    }

    /// Whether any held control pushes against the given velocity on its axis.
    pub fn opposes(&self, velocity: Vec2) -> bool {
        (self.up && velocity.y > 0.0)
            || (self.down && velocity.y < 0.0)
            || (self.left && velocity.x > 0.0)
            || (self.right && velocity.x < 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_combines_diagonals() {
        let input = DirectionalInput {
            up: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(input.axis(), Vec2::new(1.0, -1.0));
    }

    #[test]
    fn opposite_controls_cancel() {
        let input = DirectionalInput {
            left: true,
            right: true,
            ..Default::default()
        };
        assert!(input.any());
        assert_eq!(input.axis(), Vec2::ZERO);
    }

    #[test]
    fn opposes_checks_velocity_sign_per_axis() {
        let input = DirectionalInput {
            left: true,
            ..Default::default()
        };
        assert!(input.opposes(Vec2::new(5.0, 0.0)));
        assert!(!input.opposes(Vec2::new(-5.0, 0.0)));
        assert!(!input.opposes(Vec2::new(0.0, 5.0)));
        assert!(!DirectionalInput::NONE.opposes(Vec2::new(3.0, 3.0)));
    }
}
