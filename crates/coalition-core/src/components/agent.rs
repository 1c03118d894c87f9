//! Agent Components
//!
//! Individual agents: identity, fixed reliability, the review ledger they keep
//! about their peers, and the policies they were created with.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::partition::Partition;
use crate::error::ConfigError;
use crate::engine::preferences::{rank_groups, Preference};
use crate::engine::reputation::ReputationVector;

/// Unique identifier for an agent, never reused within a simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u32);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Accumulated reviews one agent has given another.
/// Both counters only ever grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub good: u32,
    pub bad: u32,
}

impl Review {
    /// Good minus bad
    pub fn net(&self) -> i64 {
        i64::from(self.good) - i64::from(self.bad)
    }

    pub fn total(&self) -> u64 {
        u64::from(self.good) + u64::from(self.bad)
    }
}

/// How an agent turns its group's work outcomes into reviews
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReviewPolicy {
    /// Success only if every other member succeeded
    Pessimist,
    /// Success if any other member succeeded
    #[default]
    Optimist,
}

impl ReviewPolicy {
    pub const NAMES: [&'static str; 2] = ["pessimist", "optimist"];

    /// Whether the round counts as a success from `own`'s point of view.
    ///
    /// Only the other members' outcomes matter. An agent alone in its group
    /// sees success under `Pessimist` and failure under `Optimist`.
    pub fn judge(&self, own: AgentId, outcomes: &BTreeMap<AgentId, bool>) -> bool {
        let mut others = outcomes
            .iter()
            .filter(|(id, _)| **id != own)
            .map(|(_, done)| *done);
        match self {
            ReviewPolicy::Pessimist => others.all(|done| done),
            ReviewPolicy::Optimist => others.any(|done| done),
        }
    }
}

impl FromStr for ReviewPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pessimist" => Ok(ReviewPolicy::Pessimist),
            "optimist" => Ok(ReviewPolicy::Optimist),
            other => Err(ConfigError::UnknownReviewPolicy(other.to_string())),
        }
    }
}

impl fmt::Display for ReviewPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewPolicy::Pessimist => write!(f, "pessimist"),
            ReviewPolicy::Optimist => write!(f, "optimist"),
        }
    }
}

/// How an agent aggregates the reputations of a group's members
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PreferencePolicy {
    #[default]
    Average,
    Minimum,
    Maximum,
}

impl PreferencePolicy {
    pub const NAMES: [&'static str; 3] = ["average", "minimum", "maximum"];
}

impl FromStr for PreferencePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "average" => Ok(PreferencePolicy::Average),
            "minimum" => Ok(PreferencePolicy::Minimum),
            "maximum" => Ok(PreferencePolicy::Maximum),
            other => Err(ConfigError::UnknownPreferencePolicy(other.to_string())),
        }
    }
}

impl fmt::Display for PreferencePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreferencePolicy::Average => write!(f, "average"),
            PreferencePolicy::Minimum => write!(f, "minimum"),
            PreferencePolicy::Maximum => write!(f, "maximum"),
        }
    }
}

/// A simulated agent
#[derive(Debug, Clone)]
pub struct Agent {
    id: AgentId,
    /// Probability of doing its work right, fixed at creation
    reliability: f64,
    reviews: BTreeMap<AgentId, Review>,
    review_policy: ReviewPolicy,
    preference_policy: PreferencePolicy,
}

impl Agent {
    pub fn new(
        id: AgentId,
        reliability: f64,
        review_policy: ReviewPolicy,
        preference_policy: PreferencePolicy,
    ) -> Self {
        debug_assert!(
            (0.0..=1.0).contains(&reliability),
            "Reliability must be a probability."
        );
        Self {
            id,
            reliability,
            reviews: BTreeMap::new(),
            review_policy,
            preference_policy,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn reliability(&self) -> f64 {
        self.reliability
    }

    pub fn review_policy(&self) -> ReviewPolicy {
        self.review_policy
    }

    pub fn preference_policy(&self) -> PreferencePolicy {
        self.preference_policy
    }

    /// Ledger of reviews this agent has given, keyed by the reviewed peer
    pub fn reviews(&self) -> &BTreeMap<AgentId, Review> {
        &self.reviews
    }

    /// Record a review about `target`.
    /// A non-negative note adds that many good reviews, a negative one adds
    /// its magnitude to the bad reviews.
    pub fn review(&mut self, target: AgentId, note: i32) {
        let entry = self.reviews.entry(target).or_default();
        if note >= 0 {
            entry.good += note.unsigned_abs();
        } else {
            entry.bad += note.unsigned_abs();
        }
    }

    /// Review every other member of the group after a round of work
    pub fn request_reviews(&mut self, outcomes: &BTreeMap<AgentId, bool>) {
        let note = if self.review_policy.judge(self.id, outcomes) { 1 } else { -1 };
        for &peer in outcomes.keys() {
            if peer == self.id {
                continue;
            }
            self.review(peer, note);
        }
    }

    /// Rank the groups of `partition`, least preferred first
    pub fn preferences(&self, partition: &Partition, reputations: &ReputationVector) -> Vec<Preference> {
        rank_groups(self.id, self.preference_policy, partition, reputations)
    }

    /// Bernoulli draw against the agent's reliability; true if the work was done right
    pub fn work<R: Rng + ?Sized>(&self, rng: &mut R) -> bool {
        rng.gen::<f64>() <= self.reliability
    }
}
