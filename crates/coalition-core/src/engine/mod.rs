//! Coalition Engine
//!
//! Partition enumeration, reputation, preferences, and stability.

pub mod partitions;
pub mod preferences;
pub mod reputation;
pub mod stability;

pub use partitions::{bell_number, Partitions};
pub use preferences::{group_value, rank_groups, AgentPreferences, Preference, PreferenceProfile};
pub use reputation::{ReputationVector, ReviewMatrix, TrustMatrix};
pub use stability::Stability;
