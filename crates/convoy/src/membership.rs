//! Free-pool bookkeeping and spawn placement.

use engine_core::Transform;
use glam::Vec2;
use hecs::{Entity, World};
use rand::prelude::*;

use crate::simulation::PlayerId;

/// Which side of the pool/chain divide a vehicle is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    /// Head of a player's chain.
    Leader { player: PlayerId },
    /// Waiting to be picked up.
    Free,
    /// Trailing a leader at the given 1-based slot.
    Follower { player: PlayerId, slot: usize },
}

/// Supplies world positions for new free vehicles.
pub trait SpawnSource {
    fn spawn_position(&mut self) -> Vec2;
}

impl<F> SpawnSource for F
where
    F: FnMut() -> Vec2,
{
    fn spawn_position(&mut self) -> Vec2 {
        self()
    }
}

/// Uniformly random positions inside an axis-aligned rectangle.
pub struct UniformSpawner {
    min: Vec2,
    max: Vec2,
    rng: StdRng,
}

impl UniformSpawner {
    /// Spawn inside `[min, max)`. Corners are reordered if given backwards.
    pub fn new(min: Vec2, max: Vec2, seed: u64) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn bounds(&self) -> (Vec2, Vec2) {
        (self.min, self.max)
    }
}

impl SpawnSource for UniformSpawner {
    fn spawn_position(&mut self) -> Vec2 {
        let t = Vec2::new(self.rng.gen::<f32>(), self.rng.gen::<f32>());
        self.min + (self.max - self.min) * t
    }
}

/// Unattached vehicles in spawn order.
///
/// The pool only holds entity handles. Taking a vehicle out hands the
/// handle to the caller, so a vehicle can never sit in the pool and a chain
/// at the same time.
#[derive(Debug, Default)]
pub struct FreePool {
    members: Vec<Entity>,
}

impl FreePool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: Entity) {
        self.members.push(entity);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.members.contains(&entity)
    }

    /// Members in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.members.iter().copied()
    }

    /// How many vehicles short of `target` the pool is.
    pub fn deficit(&self, target: usize) -> usize {
        target.saturating_sub(self.members.len())
    }

    /// Remove and return, in spawn order, every member strictly inside the
    /// box of `half_extent` around `center`.
    pub fn take_within(&mut self, world: &World, center: Vec2, half_extent: f32) -> Vec<Entity> {
        let probe = Transform::from_position(center);
        let mut taken = Vec::new();
        self.members.retain(|&entity| {
            let inside = world
                .get::<&Transform>(entity)
                .map(|t| probe.within_box(t.position, half_extent))
                .unwrap_or(false);
            if inside {
                taken.push(entity);
            }
            !inside
        });
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_spawner_stays_in_bounds_and_is_deterministic() {
        let mut a = UniformSpawner::new(Vec2::new(100.0, 50.0), Vec2::new(-100.0, -50.0), 7);
        let mut b = UniformSpawner::new(Vec2::new(-100.0, -50.0), Vec2::new(100.0, 50.0), 7);
        for _ in 0..500 {
            let p = a.spawn_position();
            assert!(p.x >= -100.0 && p.x <= 100.0);
            assert!(p.y >= -50.0 && p.y <= 50.0);
            assert_eq!(p, b.spawn_position());
        }
    }

    #[test]
    fn take_within_uses_box_and_keeps_spawn_order() {
        let mut world = World::new();
        let mut pool = FreePool::new();
        let positions = [
            Vec2::new(10.0, -10.0),
            Vec2::new(50.0, 50.0),
            Vec2::new(-15.5, 15.5),
            Vec2::new(0.0, 16.0),
        ];
        let entities: Vec<Entity> = positions
            .iter()
            .map(|&p| world.spawn((Transform::from_position(p),)))
            .collect();
        for &e in &entities {
            pool.insert(e);
        }

        let taken = pool.take_within(&world, Vec2::ZERO, 16.0);
        assert_eq!(taken, vec![entities[0], entities[2]]);
        assert_eq!(pool.len(), 2);
        assert!(pool.contains(entities[1]));
        assert!(pool.contains(entities[3]));
        assert!(!pool.contains(entities[0]));
    }

    #[test]
    fn deficit_saturates() {
        let mut world = World::new();
        let mut pool = FreePool::new();
        for _ in 0..3 {
            pool.insert(world.spawn((Transform::default(),)));
        }
        assert_eq!(pool.deficit(100), 97);
        assert_eq!(pool.deficit(2), 0);
    }
}
