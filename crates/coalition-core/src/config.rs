//! Configuration System
//!
//! Simulation settings, loadable from TOML. Every section falls back to its
//! defaults, and `validate` rejects bad values before any simulation state is
//! built.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::components::{PreferencePolicy, ReviewPolicy};
use crate::error::{ConfigError, EngineError, PartitionCount};
use crate::engine::partitions::bell_number;
use crate::engine::stability::Stability;

/// Fewest agents a simulation accepts
pub const MIN_AGENTS: usize = 3;

/// Top-level configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of agents to create
    pub agents: usize,
    pub review_policy: ReviewPolicy,
    pub preference_policy: PreferencePolicy,
    /// Equilibrium predicate used by the search
    pub stability: Stability,
    /// Seed for reproducible runs; drawn from entropy when absent
    pub seed: Option<u64>,
    /// Stop after this many rounds
    pub max_rounds: Option<u64>,
    pub reputation: ReputationConfig,
    pub search: SearchConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            agents: MIN_AGENTS,
            review_policy: ReviewPolicy::default(),
            preference_policy: PreferencePolicy::default(),
            stability: Stability::default(),
            seed: None,
            max_rounds: None,
            reputation: ReputationConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

/// Damped power-iteration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReputationConfig {
    /// Weight of the uniform prior in each step (alpha)
    pub damping: f64,
    /// Stop once the Euclidean step norm drops below this (epsilon)
    pub tolerance: f64,
    /// Hard cap on iterations; the last vector is returned if it is reached
    pub max_iterations: usize,
}

impl Default for ReputationConfig {
    fn default() -> Self {
        Self {
            damping: 0.001,
            tolerance: 0.001,
            max_iterations: 10_000,
        }
    }
}

impl ReputationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(ConfigError::InvalidReputation(format!(
                "damping must be within [0, 1], got {}",
                self.damping
            )));
        }
        if !(self.tolerance > 0.0) {
            return Err(ConfigError::InvalidReputation(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::InvalidReputation(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// What to do when a search would enumerate more partitions than allowed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LimitAction {
    /// Refuse to start the search
    #[default]
    Reject,
    /// Log a warning and enumerate anyway
    Warn,
}

/// Guard on the size of the partition search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Largest Bell number the search will enumerate
    pub partition_limit: u64,
    pub on_limit: LimitAction,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            partition_limit: 10_000_000,
            on_limit: LimitAction::Reject,
        }
    }
}

impl SearchConfig {
    /// Check an agent count against the limit.
    ///
    /// Returns `Ok(true)` when the search fits, `Ok(false)` when it does not
    /// but the action is `Warn`.
    pub fn admit(&self, agents: usize) -> Result<bool, EngineError> {
        let partitions = bell_number(agents);
        let fits = partitions.is_some_and(|count| count <= u128::from(self.partition_limit));
        if fits {
            return Ok(true);
        }
        match self.on_limit {
            LimitAction::Warn => Ok(false),
            LimitAction::Reject => Err(EngineError::EnumerationLimit {
                agents,
                partitions: PartitionCount::from(partitions),
                limit: self.partition_limit,
            }),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Reject configurations the engine cannot run
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agents < MIN_AGENTS {
            return Err(ConfigError::TooFewAgents(self.agents));
        }
        if self.search.partition_limit == 0 {
            return Err(ConfigError::InvalidPartitionLimit);
        }
        self.reputation.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimulationConfig::default();
        assert_eq!(config.agents, 3);
        assert_eq!(config.reputation.damping, 0.001);
        assert_eq!(config.reputation.tolerance, 0.001);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = SimulationConfig::from_toml(
            r#"
            agents = 5
            review_policy = "pessimist"
            preference_policy = "minimum"
            stability = "ics"
            seed = 42

            [reputation]
            max_iterations = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.agents, 5);
        assert_eq!(config.review_policy, ReviewPolicy::Pessimist);
        assert_eq!(config.preference_policy, PreferencePolicy::Minimum);
        assert_eq!(config.stability, Stability::Ics);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.reputation.max_iterations, 50);
        assert_eq!(config.reputation.damping, 0.001);
        assert_eq!(config.search.on_limit, LimitAction::Reject);
    }

    #[test]
    fn test_unknown_policy_in_toml() {
        let result = SimulationConfig::from_toml(r#"review_policy = "cynic""#);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = SimulationConfig { agents: 2, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::TooFewAgents(2))));

        let mut config = SimulationConfig::default();
        config.reputation.damping = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidReputation(_))));

        let mut config = SimulationConfig::default();
        config.reputation.tolerance = 0.0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.reputation.max_iterations = 0;
        assert!(config.validate().is_err());

        let mut config = SimulationConfig::default();
        config.search.partition_limit = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPartitionLimit)));
    }

    #[test]
    fn test_search_limit() {
        let search = SearchConfig::default();
        assert!(search.admit(12).unwrap());
        assert!(matches!(
            search.admit(13),
            Err(EngineError::EnumerationLimit { agents: 13, .. })
        ));

        let lenient = SearchConfig { partition_limit: 10, on_limit: LimitAction::Warn };
        assert!(lenient.admit(3).unwrap());
        assert!(!lenient.admit(4).unwrap());
    }
}
