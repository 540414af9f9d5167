//! Convoy motion engine: leader kinematics, trajectory history, the
//! follower chain resolver and free-pool membership, tied together by
//! [`Simulation`].

pub mod chain;
pub mod config;
pub mod history;
pub mod kinematics;
pub mod membership;
pub mod simulation;

pub use chain::*;
pub use config::*;
pub use history::*;
pub use kinematics::*;
pub use membership::*;
pub use simulation::*;
