//! Simulation Components
//!
//! Agents with their review ledgers, and the partitions they are grouped into.

pub mod agent;
pub mod partition;

pub use agent::{Agent, AgentId, PreferencePolicy, Review, ReviewPolicy};
pub use partition::{Group, Partition};
