//! Procedural generation and loading of track friction grids.

pub mod track;

pub use track::*;
