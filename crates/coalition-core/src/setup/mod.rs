//! Simulation Setup
//!
//! Agent creation with explicit id allocation.

pub mod agents;

pub use agents::{AgentFactory, IdAllocator};
