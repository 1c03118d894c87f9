//! Stability System
//!
//! Equilibrium predicates over a candidate partition. All three work on the
//! same preference profile and differ only in which deviations they let
//! block the partition:
//!
//! - `Nash`: every agent already sits in its most preferred group.
//! - `Is` (individual stability): an agent that would rather be elsewhere is
//!   only a threat if the members of its preferred group would take it in,
//!   i.e. some member values that group below the deviator's reputation.
//! - `Ics`: the `Is` check, plus the deviator's current groupmates must not
//!   value the deviator's preferred group above its reputation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::components::{Agent, AgentId, Partition};
use crate::error::ConfigError;
use crate::engine::preferences::{AgentPreferences, PreferenceProfile};
use crate::engine::reputation::ReputationVector;

/// Which equilibrium notion the search uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Stability {
    #[default]
    Nash,
    Is,
    Ics,
}

impl Stability {
    pub const NAMES: [&'static str; 3] = ["nash", "is", "ics"];

    /// Test `partition` against an already computed preference profile
    pub fn is_stable(
        &self,
        partition: &Partition,
        profile: &PreferenceProfile,
        reputations: &ReputationVector,
    ) -> bool {
        match self {
            Stability::Nash => nash_stable(partition, profile),
            Stability::Is => individually_stable(partition, profile, reputations),
            Stability::Ics => contractually_stable(partition, profile, reputations),
        }
    }

    /// Compute every agent's preferences over `partition`, then test it
    pub fn evaluate(&self, agents: &[Agent], partition: &Partition, reputations: &ReputationVector) -> bool {
        let profile = PreferenceProfile::build(agents, partition, reputations);
        self.is_stable(partition, &profile, reputations)
    }
}

impl FromStr for Stability {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nash" => Ok(Stability::Nash),
            "is" => Ok(Stability::Is),
            "ics" => Ok(Stability::Ics),
            other => Err(ConfigError::UnknownStability(other.to_string())),
        }
    }
}

impl fmt::Display for Stability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stability::Nash => write!(f, "nash"),
            Stability::Is => write!(f, "is"),
            Stability::Ics => write!(f, "ics"),
        }
    }
}

/// The group `agent` would rather join, if it is not already in it
fn wanted_move(agent: AgentId, preferences: &AgentPreferences, partition: &Partition) -> Option<usize> {
    let top = preferences.top()?;
    if partition.group(top).contains(agent) {
        None
    } else {
        Some(top)
    }
}

fn nash_stable(partition: &Partition, profile: &PreferenceProfile) -> bool {
    profile
        .iter()
        .all(|(agent, preferences)| wanted_move(agent, preferences, partition).is_none())
}

/// Some member of `target` values it below the deviator's reputation
fn accepted_by_target(
    reputation: f64,
    target: usize,
    partition: &Partition,
    profile: &PreferenceProfile,
) -> bool {
    partition
        .group(target)
        .members()
        .any(|member| profile.value_of(member, target) < reputation)
}

/// Some other member of the deviator's group values `target` above the deviator's reputation
fn pushed_out_by_groupmates(
    agent: AgentId,
    reputation: f64,
    target: usize,
    partition: &Partition,
    profile: &PreferenceProfile,
) -> bool {
    let Some(current) = partition.group_of(agent) else {
        return false;
    };
    partition
        .group(current)
        .members()
        .filter(|&mate| mate != agent)
        .any(|mate| profile.value_of(mate, target) > reputation)
}

fn individually_stable(partition: &Partition, profile: &PreferenceProfile, reputations: &ReputationVector) -> bool {
    profile.iter().all(|(agent, preferences)| match wanted_move(agent, preferences, partition) {
        None => true,
        Some(target) => !accepted_by_target(reputations[agent], target, partition, profile),
    })
}

fn contractually_stable(partition: &Partition, profile: &PreferenceProfile, reputations: &ReputationVector) -> bool {
    for (agent, preferences) in profile.iter() {
        let Some(target) = wanted_move(agent, preferences, partition) else {
            continue;
        };
        let reputation = reputations[agent];
        if accepted_by_target(reputation, target, partition, profile)
            || pushed_out_by_groupmates(agent, reputation, target, partition, profile)
        {
            return false;
        }
    }
    true
}
