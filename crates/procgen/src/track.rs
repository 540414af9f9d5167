//! Track surfaces and the friction grid vehicles drive on.
//!
//! A track is a rectangular grid of surface cells. It can be authored as an
//! ASCII map (one character per cell) or generated from a seed: fractal
//! Perlin noise scatters the off-road surfaces and a tarmac ring road is laid
//! on top so there is always a fast line around the map.

use engine_core::FrictionField;
use glam::{IVec2, Vec2};
use noise::{NoiseFn, Perlin};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ground types, from grippiest to slowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Surface {
    Tarmac,
    Gravel,
    Grass,
    Sand,
    Mud,
    Water,
}

impl Surface {
    pub const ALL: [Surface; 6] = [
        Surface::Tarmac,
        Surface::Gravel,
        Surface::Grass,
        Surface::Sand,
        Surface::Mud,
        Surface::Water,
    ];

    /// Friction coefficient; top speed on this surface is `top_speed / friction`.
    pub fn friction(self) -> f32 {
        match self {
            Surface::Tarmac => 1.0,
            Surface::Gravel => 1.5,
            Surface::Grass => 2.0,
            Surface::Sand => 3.0,
            Surface::Mud => 4.0,
            Surface::Water => 6.0,
        }
    }

    /// Character used for this surface in ASCII maps.
    pub fn symbol(self) -> char {
        match self {
            Surface::Tarmac => '#',
            Surface::Gravel => ':',
            Surface::Grass => '.',
            Surface::Sand => 's',
            Surface::Mud => 'm',
            Surface::Water => '~',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.symbol() == symbol)
    }
}

/// Why an ASCII map was rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("map has no cells")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown surface '{symbol}' at row {row}, column {column}")]
    UnknownSymbol {
        symbol: char,
        row: usize,
        column: usize,
    },
    #[error("cell size must be a positive finite number, got {0}")]
    InvalidCellSize(f32),
}

/// Parameters for a generated track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Width of the grid in cells.
    pub width: usize,
    /// Height of the grid in cells.
    pub height: usize,
    /// Cell size in world units.
    pub cell_size: f32,
    /// Seed for the surface noise.
    pub seed: u64,
    /// Noise frequency in cycles per cell (lower = larger patches).
    pub frequency: f64,
    /// Number of octaves for fractal noise.
    pub octaves: u32,
    /// Amplitude multiplier per octave.
    pub persistence: f64,
    /// Frequency multiplier per octave.
    pub lacunarity: f64,
    /// Width of the ring road in cells; 0 disables it.
    pub road_width: f32,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 48,
            cell_size: 16.0,
            seed: 0,
            frequency: 0.08,
            octaves: 3,
            persistence: 0.5,
            lacunarity: 2.0,
            road_width: 3.0,
        }
    }
}

/// A rectangular grid of surfaces anchored at `origin` (top-left corner).
#[derive(Debug, Clone)]
pub struct FrictionGrid {
    /// Width of the grid in cells.
    pub width: usize,
    /// Height of the grid in cells.
    pub height: usize,
    /// Cell size in world units.
    pub cell_size: f32,
    /// Top-left corner of the grid in world space.
    pub origin: Vec2,
    cells: Vec<Surface>,
}

impl FrictionGrid {
    /// Create a grid filled with one surface.
    pub fn new(width: usize, height: usize, cell_size: f32, origin: Vec2, fill: Surface) -> Self {
        Self {
            width,
            height,
            cell_size,
            origin,
            cells: vec![fill; width * height],
        }
    }

    /// Parse an ASCII map, one row per line, top row first.
    pub fn from_ascii(text: &str, cell_size: f32) -> Result<Self, GridError> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(GridError::InvalidCellSize(cell_size));
        }

        let rows: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        let width = rows.first().map(|r| r.chars().count()).ok_or(GridError::Empty)?;

        let mut cells = Vec::with_capacity(width * rows.len());
        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(GridError::RaggedRow {
                    row,
                    expected: width,
                    found,
                });
            }
            for (column, symbol) in line.chars().enumerate() {
                let surface = Surface::from_symbol(symbol).ok_or(GridError::UnknownSymbol {
                    symbol,
                    row,
                    column,
                })?;
                cells.push(surface);
            }
        }

        Ok(Self {
            width,
            height: rows.len(),
            cell_size,
            origin: Vec2::ZERO,
            cells,
        })
    }

    /// Generate a track from noise plus a tarmac ring road.
    pub fn generate(config: &TrackConfig) -> Self {
        let mut grid = Self::new(
            config.width,
            config.height,
            config.cell_size,
            Vec2::ZERO,
            Surface::Grass,
        );
        let perlin = Perlin::new(noise_seed(config.seed));

        for y in 0..grid.height {
            for x in 0..grid.width {
                let n = fractal_noise(&perlin, x as f64, y as f64, config);
                grid.cells[y * grid.width + x] = surface_for_noise(n);
            }
        }

        if config.road_width > 0.0 {
            grid.lay_ring_road(config.road_width);
        }

        log::debug!(
            "generated {}x{} track (seed {}), {} tarmac cells",
            grid.width,
            grid.height,
            config.seed,
            grid.count(Surface::Tarmac)
        );
        grid
    }

    /// Pave an elliptical loop inset from the edges.
    fn lay_ring_road(&mut self, road_width: f32) {
        let center = Vec2::new(self.width as f32, self.height as f32) * 0.5;
        let radii = center * 0.7;
        if radii.min_element() <= 0.0 {
            return;
        }
        let half = road_width * 0.5;
        let scale = radii.min_element();

        for y in 0..self.height {
            for x in 0..self.width {
                let cell = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let r = ((cell - center) / radii).length();
                if (r - 1.0).abs() * scale <= half {
                    self.set(x, y, Surface::Tarmac);
                }
            }
        }
    }

    /// Set the surface of a cell. Out-of-range cells are ignored.
    pub fn set(&mut self, x: usize, y: usize, surface: Surface) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = surface;
        }
    }

    /// Surface of a cell by grid coordinates.
    pub fn cell(&self, x: i32, y: i32) -> Option<Surface> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(self.cells[y as usize * self.width + x as usize])
    }

    /// Convert world position to grid coordinates.
    pub fn world_to_grid(&self, world_pos: Vec2) -> IVec2 {
        let local = (world_pos - self.origin) / self.cell_size;
        IVec2::new(local.x.floor() as i32, local.y.floor() as i32)
    }

    /// Convert grid coordinates to world position (center of cell).
    pub fn grid_to_world(&self, grid_pos: IVec2) -> Vec2 {
        self.origin + (grid_pos.as_vec2() + Vec2::splat(0.5)) * self.cell_size
    }

    /// Surface under a world position, `None` off the map.
    pub fn surface_at(&self, world_pos: Vec2) -> Option<Surface> {
        let grid = self.world_to_grid(world_pos);
        self.cell(grid.x, grid.y)
    }

    /// World-space corners `(min, max)` of the map.
    pub fn bounds(&self) -> (Vec2, Vec2) {
        let size = Vec2::new(self.width as f32, self.height as f32) * self.cell_size;
        (self.origin, self.origin + size)
    }

    /// Number of cells with the given surface.
    pub fn count(&self, surface: Surface) -> usize {
        self.cells.iter().filter(|&&s| s == surface).count()
    }
}

impl FrictionField for FrictionGrid {
    fn friction_at(&self, position: Vec2) -> Option<f32> {
        self.surface_at(position).map(Surface::friction)
    }
}

/// Derive a deterministic u32 noise seed from a track seed.
#[inline]
fn noise_seed(seed: u64) -> u32 {
    (seed.wrapping_mul(0x9e3779b97f4a7c15_u64) >> 32) as u32
}

/// Fractal Perlin noise normalized to 0-1.
fn fractal_noise(perlin: &Perlin, x: f64, y: f64, config: &TrackConfig) -> f64 {
    let mut value = 0.0;
    let mut amplitude = 1.0;
    let mut frequency = config.frequency;
    let mut max_value = 0.0;

    for _ in 0..config.octaves.max(1) {
        value += perlin.get([x * frequency, y * frequency]) * amplitude;
        max_value += amplitude;
        amplitude *= config.persistence;
        frequency *= config.lacunarity;
    }

    ((value / max_value + 1.0) * 0.5).clamp(0.0, 1.0)
}

fn surface_for_noise(n: f64) -> Surface {
    match n {
        n if n < 0.25 => Surface::Water,
        n if n < 0.33 => Surface::Mud,
        n if n < 0.40 => Surface::Sand,
        n if n < 0.65 => Surface::Grass,
        _ => Surface::Gravel,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_map_lookups() {
        let grid = FrictionGrid::from_ascii("##.\n~m:\n", 10.0).unwrap();
        assert_eq!(grid.width, 3);
        assert_eq!(grid.height, 2);
        assert_eq!(grid.friction_at(Vec2::new(5.0, 5.0)), Some(1.0));
        assert_eq!(grid.friction_at(Vec2::new(25.0, 5.0)), Some(2.0));
        assert_eq!(grid.friction_at(Vec2::new(5.0, 15.0)), Some(6.0));
        assert_eq!(grid.friction_at(Vec2::new(29.9, 19.9)), Some(1.5));
        assert_eq!(grid.friction_at(Vec2::new(30.0, 5.0)), None);
        assert_eq!(grid.friction_at(Vec2::new(-0.1, 5.0)), None);
        assert_eq!(grid.bounds(), (Vec2::ZERO, Vec2::new(30.0, 20.0)));
    }

    #[test]
    fn ascii_map_errors() {
        assert_eq!(FrictionGrid::from_ascii("\n\n", 1.0).unwrap_err(), GridError::Empty);
        assert_eq!(
            FrictionGrid::from_ascii("###\n##\n", 1.0).unwrap_err(),
            GridError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            }
        );
        assert_eq!(
            FrictionGrid::from_ascii("#x#\n", 1.0).unwrap_err(),
            GridError::UnknownSymbol {
                symbol: 'x',
                row: 0,
                column: 1
            }
        );
        assert_eq!(
            FrictionGrid::from_ascii("#", 0.0).unwrap_err(),
            GridError::InvalidCellSize(0.0)
        );
    }

    #[test]
    fn surface_symbols_are_unique() {
        for s in Surface::ALL {
            assert_eq!(Surface::from_symbol(s.symbol()), Some(s));
        }
    }

    #[test]
    fn generate_deterministic_same_seed() {
        let config = TrackConfig {
            seed: 777,
            ..Default::default()
        };
        let a = FrictionGrid::generate(&config);
        let b = FrictionGrid::generate(&config);
        assert_eq!(a.cells, b.cells);
    }

    #[test]
    fn generate_lays_ring_road() {
        let config = TrackConfig::default();
        let grid = FrictionGrid::generate(&config);
        assert!(grid.count(Surface::Tarmac) > 0);
        // The ring passes straight above the center, 70% of the way to the top edge.
        let x = (config.width / 2) as i32;
        let y = (config.height as f32 * 0.5 - config.height as f32 * 0.35) as i32;
        assert_eq!(grid.cell(x, y), Some(Surface::Tarmac));
    }

    #[test]
    fn world_grid_conversions_match() {
        let grid = FrictionGrid::new(8, 8, 4.0, Vec2::new(-16.0, -16.0), Surface::Sand);
        let cell = grid.world_to_grid(Vec2::new(-13.0, 1.0));
        assert_eq!(cell, IVec2::new(0, 4));
        assert_eq!(grid.grid_to_world(cell), Vec2::new(-14.0, 2.0));
        assert_eq!(grid.surface_at(Vec2::new(15.9, 15.9)), Some(Surface::Sand));
        assert_eq!(grid.surface_at(Vec2::new(16.0, 0.0)), None);
    }
}
