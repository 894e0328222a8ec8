//! Cell Pilot
//!
//! Decision core for an autonomous agent in an agar-style arena: picks one
//! destination per tick that keeps clear of larger cells, hazards and walls,
//! forages when safe, and can feed a designated ally.
//!
//! # Features
//!
//! - `pool` - Tick several agents in parallel with rayon (enabled by default)

pub mod bot;
pub mod command;
pub mod config;
pub mod runner;
pub mod util;
pub mod world;
