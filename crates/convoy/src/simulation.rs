//! The simulation context: every leader, its chain, and the shared free pool.

use engine_core::{DirectionalInput, FrictionField, Livery, Transform, Velocity};
use glam::Vec2;
use hecs::{Entity, World};

use crate::chain::{resolve_chain, ChainResolution};
use crate::config::{ConfigError, ConvoyConfig};
use crate::history::TrajectoryHistory;
use crate::kinematics::{steer, Kinematic};
use crate::membership::{FreePool, Membership, SpawnSource};

/// Index of a player (and of its leader) in spawn order.
pub type PlayerId = usize;

/// A player's lead vehicle together with its trail.
#[derive(Debug)]
pub struct Leader {
    player: PlayerId,
    entity: Entity,
    livery: Livery,
    history: TrajectoryHistory,
    chain: Vec<Entity>,
    odometer: f32,
    pickups: u32,
}

impl Leader {
    pub fn player(&self) -> PlayerId {
        self.player
    }

    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn livery(&self) -> Livery {
        self.livery
    }

    pub fn history(&self) -> &TrajectoryHistory {
        &self.history
    }

    /// Followers front (nearest the leader) to back.
    pub fn chain(&self) -> &[Entity] {
        &self.chain
    }

    /// Distance driven so far.
    pub fn odometer(&self) -> f32 {
        self.odometer
    }

    pub fn pickups(&self) -> u32 {
        self.pickups
    }
}

/// Read-only view of one vehicle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleState {
    pub entity: Entity,
    pub position: Vec2,
    pub velocity: Vec2,
    pub livery: Livery,
    pub membership: Membership,
}

/// A vehicle joining a chain this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attachment {
    pub player: PlayerId,
    pub vehicle: Entity,
    /// 1-based position in the chain.
    pub slot: usize,
}

/// What happened during one [`Simulation::tick`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub attachments: Vec<Attachment>,
    /// Followers left in place for lack of history, summed over leaders.
    pub followers_skipped: usize,
    pub soft_corrections: usize,
    pub hard_corrections: usize,
    /// Free vehicles spawned to refill the pool.
    pub spawned: usize,
}

/// One leader and its chain as seen by a renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvoySnapshot {
    pub player: PlayerId,
    pub leader: VehicleState,
    pub chain: Vec<VehicleState>,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub convoys: Vec<ConvoySnapshot>,
    pub free: Vec<VehicleState>,
}

/// Owns the ECS world, all leaders and the free pool.
pub struct Simulation {
    config: ConvoyConfig,
    world: World,
    leaders: Vec<Leader>,
    pool: FreePool,
    field: Box<dyn FrictionField>,
    spawner: Box<dyn SpawnSource>,
    frame: u64,
}

impl Simulation {
    pub fn new(
        config: ConvoyConfig,
        field: impl FrictionField + 'static,
        spawner: impl SpawnSource + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            world: World::new(),
            leaders: Vec::new(),
            pool: FreePool::new(),
            field: Box::new(field),
            spawner: Box::new(spawner),
            frame: 0,
        })
    }

    /// Spawn a leader for a new player. Players are processed in the order
    /// they were added, which also settles contested pickups.
    pub fn add_player(&mut self, position: Vec2, livery: Livery) -> PlayerId {
        let player = self.leaders.len();
        let entity = self.world.spawn((
            Transform::from_position(position),
            Velocity::default(),
            livery,
            Membership::Leader { player },
        ));
        self.leaders.push(Leader {
            player,
            entity,
            livery,
            history: TrajectoryHistory::new(self.config.history_capacity),
            chain: Vec::new(),
            odometer: 0.0,
            pickups: 0,
        });
        log::info!("player {} joined at ({:.1}, {:.1})", player, position.x, position.y);
        player
    }

    /// Put a stationary free vehicle on the map.
    pub fn spawn_free(&mut self, position: Vec2) -> Entity {
        let entity = self.world.spawn((
            Transform::from_position(position),
            Velocity::default(),
            Livery::default(),
            Membership::Free,
        ));
        self.pool.insert(entity);
        entity
    }

    /// Advance one frame.
    ///
    /// `dt` must already be clamped by the caller to a small positive value;
    /// `inputs[i]` steers player `i`, and players without an entry coast.
    pub fn tick(&mut self, dt: f32, inputs: &[DirectionalInput]) -> TickReport {
        debug_assert!(dt.is_finite() && dt >= 0.0, "dt must be finite and non-negative, got {dt}");
        self.frame += 1;
        let mut report = TickReport::default();

        for index in 0..self.leaders.len() {
            let input = inputs.get(index).copied().unwrap_or_default();
            self.drive_leader(index, input, dt);
            let resolution = self.resolve_followers(index);
            report.followers_skipped += resolution.skipped;
            report.soft_corrections += resolution.soft_corrections;
            report.hard_corrections += resolution.hard_corrections;
        }

        for index in 0..self.leaders.len() {
            self.attach_nearby(index, &mut report);
        }

        report.spawned = self.replenish_pool();
        report
    }

    fn drive_leader(&mut self, index: usize, input: DirectionalInput, dt: f32) {
        let leader = &mut self.leaders[index];
        let Ok((transform, velocity)) = self
            .world
            .query_one_mut::<(&mut Transform, &mut Velocity)>(leader.entity)
        else {
            return;
        };

        velocity.linear = steer(
            velocity.linear,
            transform.position,
            input,
            self.field.as_ref(),
            &self.config,
            dt,
        );
        // Followers read the un-integrated velocity.
        leader.history.record(velocity.linear);

        let before = transform.position;
        transform.integrate(velocity.linear, dt);
        leader.odometer += before.distance(transform.position);
    }

    fn resolve_followers(&mut self, index: usize) -> ChainResolution {
        let leader = &self.leaders[index];
        if leader.chain.is_empty() {
            return ChainResolution::default();
        }
        let Some(head) = read_kinematic(&self.world, leader.entity) else {
            return ChainResolution::default();
        };
        let Some(mut followers) = leader
            .chain
            .iter()
            .map(|&e| read_kinematic(&self.world, e))
            .collect::<Option<Vec<_>>>()
        else {
            log::warn!("player {} has a chain member missing from the world", leader.player);
            return ChainResolution::default();
        };

        let resolution = resolve_chain(&leader.history, head, &mut followers, &self.config);
        if resolution.skipped > 0 {
            log::trace!(
                "player {}: {} follower(s) waiting for history ({:.0} arc units recorded)",
                leader.player,
                resolution.skipped,
                leader.history.arc_length()
            );
        }

        for (&entity, state) in leader.chain.iter().zip(&followers).take(resolution.resolved) {
            if let Ok((transform, velocity)) =
                self.world.query_one_mut::<(&mut Transform, &mut Velocity)>(entity)
            {
                transform.position = state.position;
                velocity.linear = state.velocity;
            }
        }
        resolution
    }

    fn attach_nearby(&mut self, index: usize, report: &mut TickReport) {
        let leader = &mut self.leaders[index];
        let Ok(center) = self.world.get::<&Transform>(leader.entity).map(|t| t.position) else {
            return;
        };

        let taken = self
            .pool
            .take_within(&self.world, center, self.config.pickup_half_extent);
        for vehicle in taken {
            leader.chain.push(vehicle);
            leader.pickups += 1;
            let slot = leader.chain.len();
            if let Ok((livery, membership)) =
                self.world.query_one_mut::<(&mut Livery, &mut Membership)>(vehicle)
            {
                *livery = leader.livery;
                *membership = Membership::Follower {
                    player: leader.player,
                    slot,
                };
            }
            log::debug!("player {} picked up {:?} into slot {}", leader.player, vehicle, slot);
            report.attachments.push(Attachment {
                player: leader.player,
                vehicle,
                slot,
            });
        }
    }

    fn replenish_pool(&mut self) -> usize {
        let missing = self.pool.deficit(self.config.free_pool_target);
        for _ in 0..missing {
            let position = self.spawner.spawn_position();
            self.spawn_free(position);
        }
        missing
    }

    pub fn config(&self) -> &ConvoyConfig {
        &self.config
    }

    /// The ECS world, for read-only lookups by entity.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn leaders(&self) -> &[Leader] {
        &self.leaders
    }

    pub fn leader(&self, player: PlayerId) -> Option<&Leader> {
        self.leaders.get(player)
    }

    pub fn free_pool(&self) -> &FreePool {
        &self.pool
    }

    /// Frames simulated so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn vehicle(&self, entity: Entity) -> Option<VehicleState> {
        let mut query = self
            .world
            .query_one::<(&Transform, &Velocity, &Livery, &Membership)>(entity)
            .ok()?;
        let state = query.get().map(|(t, v, l, m)| VehicleState {
            entity,
            position: t.position,
            velocity: v.linear,
            livery: *l,
            membership: *m,
        });
        state
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        let convoys = self
            .leaders
            .iter()
            .filter_map(|leader| {
                Some(ConvoySnapshot {
                    player: leader.player,
                    leader: self.vehicle(leader.entity)?,
                    chain: leader.chain.iter().filter_map(|&e| self.vehicle(e)).collect(),
                })
            })
            .collect();
        let free = self.pool.iter().filter_map(|e| self.vehicle(e)).collect();
        FrameSnapshot {
            frame: self.frame,
            convoys,
            free,
        }
    }
}

fn read_kinematic(world: &World, entity: Entity) -> Option<Kinematic> {
    let mut query = world.query_one::<(&Transform, &Velocity)>(entity).ok()?;
    let state = query
        .get()
        .map(|(t, v)| Kinematic::new(t.position, v.linear));
    state
}
