//! Surface friction lookup consumed by vehicle kinematics.

use glam::Vec2;

/// Maps a world position to a speed-limiting friction coefficient.
///
/// `None` means the position lies outside the known map; callers substitute
/// their own default coefficient.
pub trait FrictionField {
    fn friction_at(&self, position: Vec2) -> Option<f32>;
}

impl<F> FrictionField for F
where
    F: Fn(Vec2) -> Option<f32>,
{
    fn friction_at(&self, position: Vec2) -> Option<f32> {
        self(position)
    }
}

/// The same coefficient everywhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformFriction(pub f32);

impl FrictionField for UniformFriction {
    fn friction_at(&self, _position: Vec2) -> Option<f32> {
        Some(self.0)
    }
}

/// A field with no map at all: every lookup is out of bounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMap;

impl FrictionField for NoMap {
    fn friction_at(&self, _position: Vec2) -> Option<f32> {
        None
    }
}
