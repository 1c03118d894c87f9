//! Coalition Formation Simulation Library
//!
//! Agents with static reliability are grouped into coalitions, work, and
//! review each other. Reviews feed a global reputation, and reputation drives
//! which partition of the agents counts as stable for the next round.
//!
//! The module split is organisational. `components` holds the plain data
//! types (agents, groups, partitions), `engine` the algorithms over them, and
//! `game` the sequential round loop that ties them together.

pub mod components;
pub mod config;
pub mod error;
pub mod game;
pub mod output;
pub mod setup;
pub mod engine;
pub mod world;

pub use components::*;
pub use config::{LimitAction, ReputationConfig, SearchConfig, SimulationConfig, MIN_AGENTS};
pub use error::{ConfigError, EngineError, PartitionCount};
pub use game::{Game, Phase};
pub use engine::Stability;
pub use world::World;
