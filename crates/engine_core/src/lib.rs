//! Core engine types and utilities for Convoy.
//!
//! This crate provides the foundational types used across all engine systems:
//! - Transform and velocity components for 2D point vehicles
//! - Per-player directional input snapshots
//! - The friction field boundary the motion core samples
//! - Time management

pub mod components;
pub mod friction;
pub mod time;
pub mod transform;

pub use components::*;
pub use friction::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{IVec2, Vec2};
pub use hecs::{Entity, World};
