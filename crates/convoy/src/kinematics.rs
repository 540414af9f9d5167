//! Leader driving model: acceleration, braking and surface-limited top speed.

use engine_core::{DirectionalInput, FrictionField};
use glam::Vec2;

use crate::config::ConvoyConfig;

/// Position and velocity of one vehicle, detached from the ECS world.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Kinematic {
    pub position: Vec2,
    pub velocity: Vec2,
}

impl Kinematic {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self { position, velocity }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// Friction coefficient under a vehicle at `position`, sampled at the
/// configured probe offset. Off-map probes use the out-of-bounds default.
pub fn surface_coefficient(position: Vec2, field: &dyn FrictionField, config: &ConvoyConfig) -> f32 {
    field
        .friction_at(position + config.friction_probe_offset)
        .unwrap_or(config.out_of_bounds_friction)
}

/// Speed limit imposed by a surface coefficient.
pub fn surface_speed_limit(coefficient: f32, config: &ConvoyConfig) -> f32 {
    config.top_speed / coefficient
}

/// Compute a leader's new velocity for this frame. Position is not touched:
/// the caller records the returned velocity before integrating.
pub fn steer(
    velocity: Vec2,
    position: Vec2,
    input: DirectionalInput,
    field: &dyn FrictionField,
    config: &ConvoyConfig,
    dt: f32,
) -> Vec2 {
    let braking = input.opposes(velocity);
    // Opposite controls cancel to a zero axis, which counts as no direction.
    let desired = input.axis().normalize_or_zero();
    let accelerating = desired != Vec2::ZERO;

    let direction = if accelerating && !braking {
        desired
    } else {
        velocity.normalize_or_zero()
    };

    let mut speed = velocity.length();
    if braking {
        speed -= dt * config.braking;
    } else if accelerating {
        speed += dt * config.acceleration;
    }

    let limit = surface_speed_limit(surface_coefficient(position, field, config), config);
    if speed > limit {
        speed -= (speed - limit) * dt * config.overspeed_bleed();
    }

    speed -= dt * config.rolling_drag();
    let speed = speed.clamp(0.0, config.top_speed);

    direction * speed
}
