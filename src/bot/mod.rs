//! Decision core
//!
//! One tick runs, in order: entity classification, food clustering, obstacle
//! sectors, circular merging, destination selection. The feeding state
//! machine can override the destination.

pub mod classify;
pub mod constants;
pub mod destination;
pub mod feeding;
pub mod food;
pub mod obstacles;
pub mod pilot;
pub mod sectors;

#[cfg(feature = "pool")]
pub mod pool;

pub use pilot::{Decision, Memory, Pilot, Signal};
