//! Tunable constants for the motion engine.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected [`ConvoyConfig`] values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be a positive finite number, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must be a non-negative finite number, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("friction probe offset must be finite, got {0}")]
    NonFiniteOffset(Vec2),
    #[error("history capacity must hold at least one sample")]
    EmptyHistory,
}

/// Every constant the motion engine reads. Missing fields in a config file
/// fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvoyConfig {
    /// Speed ceiling on the grippiest surface (units/sec).
    pub top_speed: f32,
    /// Speed gained per second while a direction is held.
    pub acceleration: f32,
    /// Speed lost per second while a held control opposes motion.
    pub braking: f32,
    /// Excess speed above the surface limit bleeds at `top_speed / divisor` per second.
    pub overspeed_bleed_divisor: f32,
    /// Constant rolling drag of `top_speed / divisor` per second.
    pub rolling_drag_divisor: f32,
    /// Where friction is sampled relative to the vehicle. With +Y down the
    /// default `(0, -1)` sits one unit up the screen from the vehicle.
    pub friction_probe_offset: Vec2,
    /// Coefficient used when the probe falls outside the map.
    pub out_of_bounds_friction: f32,
    /// Velocity samples kept per leader.
    pub history_capacity: usize,
    /// Spacing between consecutive chain members (world units).
    pub follower_gap: f32,
    /// Displacement beyond `follower_gap + margin` triggers a hard snap.
    pub hard_snap_margin: f32,
    /// Converts chain-slot distance into history arc-length units.
    pub arc_length_scale: f32,
    /// Half-width of the pickup box around a leader.
    pub pickup_half_extent: f32,
    /// Free vehicles kept waiting on the map.
    pub free_pool_target: usize,
}

impl Default for ConvoyConfig {
    fn default() -> Self {
        Self {
            top_speed: 60.0,
            acceleration: 30.0,
            braking: 60.0,
            overspeed_bleed_divisor: 6.0,
            rolling_drag_divisor: 6.0,
            friction_probe_offset: Vec2::new(0.0, -1.0),
            out_of_bounds_friction: 10.0,
            history_capacity: 2000,
            follower_gap: 14.0,
            hard_snap_margin: 0.5,
            arc_length_scale: 64.0,
            pickup_half_extent: 16.0,
            free_pool_target: 100,
        }
    }
}

impl ConvoyConfig {
    /// Rate at which speed above the surface limit is bled off.
    pub fn overspeed_bleed(&self) -> f32 {
        self.top_speed / self.overspeed_bleed_divisor
    }

    /// Constant per-second speed loss.
    pub fn rolling_drag(&self) -> f32 {
        self.top_speed / self.rolling_drag_divisor
    }

    /// History arc length a follower in `slot` (1-based) trails the leader by.
    pub fn follower_target(&self, slot: usize) -> f32 {
        slot as f32 * self.follower_gap * self.arc_length_scale
    }

    /// Distance at which spacing stops being nudged and is snapped instead.
    pub fn hard_snap_distance(&self) -> f32 {
        self.follower_gap + self.hard_snap_margin
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("top_speed", self.top_speed),
            ("acceleration", self.acceleration),
            ("braking", self.braking),
            ("overspeed_bleed_divisor", self.overspeed_bleed_divisor),
            ("rolling_drag_divisor", self.rolling_drag_divisor),
            ("out_of_bounds_friction", self.out_of_bounds_friction),
            ("follower_gap", self.follower_gap),
            ("arc_length_scale", self.arc_length_scale),
            ("pickup_half_extent", self.pickup_half_extent),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { field, value });
            }
        }
        if !(self.hard_snap_margin.is_finite() && self.hard_snap_margin >= 0.0) {
            return Err(ConfigError::Negative {
                field: "hard_snap_margin",
                value: self.hard_snap_margin,
            });
        }
        if !self.friction_probe_offset.is_finite() {
            return Err(ConfigError::NonFiniteOffset(self.friction_probe_offset));
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::EmptyHistory);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ConvoyConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.rolling_drag(), 10.0);
        assert_eq!(config.follower_target(2), 2.0 * 14.0 * 64.0);
    }

    #[test]
    fn rejects_non_positive_gap() {
        let config = ConvoyConfig {
            follower_gap: 0.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "follower_gap",
                value: 0.0
            })
        );
    }

    #[test]
    fn rejects_nan_and_empty_history() {
        let nan_speed = ConvoyConfig {
            top_speed: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            nan_speed.validate(),
            Err(ConfigError::NotPositive { field: "top_speed", .. })
        ));

        let no_history = ConvoyConfig {
            history_capacity: 0,
            ..Default::default()
        };
        assert_eq!(no_history.validate(), Err(ConfigError::EmptyHistory));
    }
}
