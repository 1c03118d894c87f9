//! Error Types
//!
//! Configuration errors are detected at the boundary before any simulation
//! state exists. Engine errors cover resource guards on enumeration.

use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error parsing TOML config
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("at least three agents are required, got {0}")]
    TooFewAgents(usize),
    #[error("{0} is not a review policy, choose from [pessimist, optimist]")]
    UnknownReviewPolicy(String),
    #[error("{0} is not a preference policy, choose from [average, minimum, maximum]")]
    UnknownPreferencePolicy(String),
    #[error("{0} is not a game type, choose from [nash, is, ics]")]
    UnknownStability(String),
    #[error("invalid reputation settings: {0}")]
    InvalidReputation(String),
    #[error("partition limit must be at least 1")]
    InvalidPartitionLimit,
}

/// Errors raised by the simulation engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The partition enumerator needs at least one element
    #[error("cannot enumerate partitions of an empty set")]
    EmptyUniverse,
    /// Bell(agents) exceeds the configured guard
    #[error(
        "enumerating partitions of {agents} agents needs {partitions} candidates, above the limit of {limit}"
    )]
    EnumerationLimit {
        agents: usize,
        partitions: PartitionCount,
        limit: u64,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Bell number of a universe, or `Overflow` when it does not fit in `u128`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionCount {
    Exact(u128),
    Overflow,
}

impl std::fmt::Display for PartitionCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartitionCount::Exact(n) => write!(f, "{}", n),
            PartitionCount::Overflow => write!(f, "more than 2^128"),
        }
    }
}

impl From<Option<u128>> for PartitionCount {
    fn from(count: Option<u128>) -> Self {
        count.map_or(PartitionCount::Overflow, PartitionCount::Exact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_messages() {
        assert_eq!(
            ConfigError::TooFewAgents(2).to_string(),
            "at least three agents are required, got 2"
        );
        assert!(ConfigError::UnknownStability("core".into())
            .to_string()
            .contains("nash, is, ics"));
    }

    #[test]
    fn test_enumeration_limit_message() {
        let err = EngineError::EnumerationLimit {
            agents: 13,
            partitions: PartitionCount::Exact(27_644_437),
            limit: 10_000_000,
        };
        assert_eq!(
            err.to_string(),
            "enumerating partitions of 13 agents needs 27644437 candidates, above the limit of 10000000"
        );
        let overflow = EngineError::EnumerationLimit {
            agents: 200,
            partitions: None.into(),
            limit: 10,
        };
        assert!(overflow.to_string().contains("more than 2^128"));
    }
}
