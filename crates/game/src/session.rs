//! Headless session: builds the track and simulation from config and runs it
//! at a fixed frame rate.

use anyhow::{ensure, Context, Result};
use convoy::{Simulation, TickReport, UniformSpawner};
use engine_core::{DirectionalInput, Livery, Time, Vec2, DEFAULT_MAX_DELTA, DEFAULT_MIN_DELTA};
use input::InputState;
use procgen::FrictionGrid;
use std::time::Duration;

use crate::autopilot::Autopilot;
use crate::config::{GameConfig, TrackSource};

/// Horizontal spacing between players' starting positions.
const START_SPACING: f32 = 48.0;

/// Totals gathered while running.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionTotals {
    pub frames: u64,
    pub attachments: usize,
    pub spawned: usize,
    pub hard_corrections: usize,
    pub soft_corrections: usize,
}

impl SessionTotals {
    fn add(&mut self, report: &TickReport) {
        self.frames += 1;
        self.attachments += report.attachments.len();
        self.spawned += report.spawned;
        self.hard_corrections += report.hard_corrections;
        self.soft_corrections += report.soft_corrections;
    }
}

/// End-of-run line for one player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSummary {
    pub player: usize,
    pub chain_length: usize,
    pub pickups: u32,
    pub distance: f32,
}

pub struct Session {
    sim: Simulation,
    time: Time,
    input: InputState,
    pilots: Vec<Autopilot>,
    frame_duration: Duration,
    totals: SessionTotals,
}

/// Build or load the friction grid. Map problems abort startup.
pub fn load_track(source: &TrackSource) -> Result<FrictionGrid> {
    match source {
        TrackSource::Generated(track) => {
            ensure!(
                track.width > 0 && track.height > 0,
                "generated track must have at least one cell, got {}x{}",
                track.width,
                track.height
            );
            ensure!(
                track.cell_size.is_finite() && track.cell_size > 0.0,
                "track cell size must be positive, got {}",
                track.cell_size
            );
            Ok(FrictionGrid::generate(track))
        }
        TrackSource::Ascii { path, cell_size } => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading track map {}", path.display()))?;
            FrictionGrid::from_ascii(&text, *cell_size)
                .with_context(|| format!("parsing track map {}", path.display()))
        }
    }
}

/// Fixed frame length for `frame_rate`. Rates whose frame would fall outside
/// the dt clamp are refused, otherwise simulated and elapsed time drift apart.
pub fn frame_step(frame_rate: f32) -> Result<Duration> {
    let slowest = 1.0 / DEFAULT_MAX_DELTA.as_secs_f64();
    let fastest = 1.0 / DEFAULT_MIN_DELTA.as_secs_f64();
    ensure!(
        (slowest..=fastest).contains(&(frame_rate as f64)),
        "frame rate must be between {:.0} and {:.0} Hz, got {}",
        slowest,
        fastest,
        frame_rate
    );
    Duration::try_from_secs_f32(1.0 / frame_rate)
        .with_context(|| format!("frame rate {frame_rate} Hz has no usable frame length"))
}

impl Session {
    pub fn new(config: &GameConfig) -> Result<Self> {
        let session = &config.session;
        let frame_duration = frame_step(session.frame_rate)?;
        ensure!(!session.players.is_empty(), "at least one player is required");

        let grid = load_track(&config.track)?;
        let (min, max) = grid.bounds();
        let center = (min + max) * 0.5;
        log::info!(
            "track {}x{} cells ({:.0} x {:.0} units)",
            grid.width,
            grid.height,
            max.x - min.x,
            max.y - min.y
        );

        let spawner = UniformSpawner::new(min, max, session.seed);
        let mut sim = Simulation::new(config.convoy.clone(), grid, spawner)
            .context("invalid convoy configuration")?;

        let count = session.players.len();
        let mut pilots = Vec::with_capacity(count);
        for (index, player) in session.players.iter().enumerate() {
            let offset = (index as f32 - (count - 1) as f32 * 0.5) * START_SPACING;
            let id = sim.add_player(center + Vec2::new(offset, 0.0), Livery(player.livery));
            pilots.push(Autopilot::new(id, player.scheme.bindings(), center));
        }

        Ok(Self {
            sim,
            time: Time::new(),
            input: InputState::new(),
            pilots,
            frame_duration,
            totals: SessionTotals::default(),
        })
    }

    /// Run one fixed-rate frame.
    pub fn step(&mut self) -> TickReport {
        self.input.begin_frame();
        for pilot in &self.pilots {
            pilot.steer(&self.sim, &mut self.input);
        }
        let inputs: Vec<DirectionalInput> = self
            .pilots
            .iter()
            .map(|p| self.input.directional(p.bindings()))
            .collect();

        self.time.advance(self.frame_duration);
        let report = self.sim.tick(self.time.clamped_delta_seconds(), &inputs);
        self.totals.add(&report);
        report
    }

    /// Run until `duration` of simulated time has passed, logging once per
    /// simulated second.
    pub fn run(&mut self, duration: Duration) {
        let mut next_status = Duration::from_secs(1);
        while self.time.elapsed() < duration {
            self.step();
            if self.time.elapsed() >= next_status {
                next_status += Duration::from_secs(1);
                log::info!("{}", self.status_line());
            }
        }
    }

    fn status_line(&self) -> String {
        let chains: Vec<String> = self
            .sim
            .leaders()
            .iter()
            .map(|l| format!("p{}={}", l.player(), l.chain().len()))
            .collect();
        format!(
            "t={:>5.1}s frame {} | chains {} | free {}",
            self.time.elapsed_seconds(),
            self.sim.frame(),
            chains.join(" "),
            self.sim.free_pool().len()
        )
    }

    pub fn summary(&self) -> Vec<PlayerSummary> {
        self.sim
            .leaders()
            .iter()
            .map(|l| PlayerSummary {
                player: l.player(),
                chain_length: l.chain().len(),
                pickups: l.pickups(),
                distance: l.odometer(),
            })
            .collect()
    }

    pub fn totals(&self) -> &SessionTotals {
        &self.totals
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }
}
