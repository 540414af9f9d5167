//! Scripted drivers for headless runs.
//!
//! Each autopilot owns one player's bindings and presses them through the
//! shared `InputState`, the same way keyboard events would, so the
//! simulation only ever sees ordinary directional input.

use convoy::{PlayerId, Simulation};
use engine_core::{DirectionalInput, Vec2};
use input::{ControlBindings, InputState};

/// Drives one leader toward the nearest free vehicle.
#[derive(Debug, Clone)]
pub struct Autopilot {
    player: PlayerId,
    bindings: ControlBindings,
    /// Axis offsets smaller than this are left alone.
    deadzone: f32,
    /// Where to head when there is nothing to pick up.
    home: Vec2,
}

impl Autopilot {
    pub fn new(player: PlayerId, bindings: ControlBindings, home: Vec2) -> Self {
        Self {
            player,
            bindings,
            deadzone: 2.0,
            home,
        }
    }

    pub fn bindings(&self) -> &ControlBindings {
        &self.bindings
    }

    /// Nearest free vehicle to this player's leader.
    pub fn target(&self, sim: &Simulation) -> Option<Vec2> {
        let leader = sim.vehicle(sim.leader(self.player)?.entity())?;
        sim.free_pool()
            .iter()
            .filter_map(|e| sim.vehicle(e))
            .map(|v| v.position)
            .min_by(|a, b| {
                a.distance_squared(leader.position)
                    .total_cmp(&b.distance_squared(leader.position))
            })
    }

    /// Press this player's keys for the coming frame.
    pub fn steer(&self, sim: &Simulation, input: &mut InputState) {
        let Some(leader) = sim.leader(self.player).and_then(|l| sim.vehicle(l.entity())) else {
            return;
        };
        let target = self.target(sim).unwrap_or(self.home);
        let wanted = keys_toward(target - leader.position, self.deadzone);

        input.set_key(self.bindings.up, wanted.up);
        input.set_key(self.bindings.down, wanted.down);
        input.set_key(self.bindings.left, wanted.left);
        input.set_key(self.bindings.right, wanted.right);
    }
}

/// Directional keys that move toward `delta` (screen axes, up is -Y).
pub fn keys_toward(delta: Vec2, deadzone: f32) -> DirectionalInput {
    DirectionalInput {
        up: delta.y < -deadzone,
        down: delta.y > deadzone,
        left: delta.x < -deadzone,
        right: delta.x > deadzone,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convoy::ConvoyConfig;
    use engine_core::{Livery, UniformFriction};
    use input::BindingScheme;

    #[test]
    fn keys_toward_respects_deadzone() {
        let keys = keys_toward(Vec2::new(10.0, -1.0), 2.0);
        assert_eq!(
            keys,
            DirectionalInput {
                right: true,
                ..Default::default()
            }
        );
        assert_eq!(keys_toward(Vec2::new(-5.0, 5.0), 2.0).axis(), Vec2::new(-1.0, 1.0));
        assert!(!keys_toward(Vec2::splat(1.0), 2.0).any());
    }

    #[test]
    fn steers_toward_nearest_free_vehicle() {
        let mut sim = Simulation::new(ConvoyConfig::default(), UniformFriction(1.0), || {
            Vec2::splat(5_000.0)
        })
        .unwrap();
        let player = sim.add_player(Vec2::ZERO, Livery(1));
        sim.spawn_free(Vec2::new(-100.0, 40.0));
        sim.spawn_free(Vec2::new(300.0, 0.0));

        let bindings = BindingScheme::Wasd.bindings();
        let pilot = Autopilot::new(player, bindings, Vec2::ZERO);
        assert_eq!(pilot.target(&sim), Some(Vec2::new(-100.0, 40.0)));

        let mut input = InputState::new();
        pilot.steer(&sim, &mut input);
        assert_eq!(
            input.directional(&bindings),
            DirectionalInput {
                left: true,
                down: true,
                ..Default::default()
            }
        );
    }
}
