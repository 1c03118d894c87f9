//! Preference System
//!
//! Each agent ranks the groups of a candidate partition by the aggregated
//! reputation of their members.

use std::collections::BTreeMap;

use crate::components::{Agent, AgentId, Group, Partition, PreferencePolicy};
use crate::engine::reputation::ReputationVector;

/// One agent's valuation of one group of a partition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preference {
    /// Index of the group within the partition
    pub group: usize,
    pub value: f64,
}

/// Value `agent` assigns to `group` under `policy`.
///
/// Singletons are worth 0. Otherwise the agent aggregates the reputations of
/// the members other than itself (every member, if it does not belong to the
/// group) and divides the aggregate once more by `|group| - 1`.
pub fn group_value(
    agent: AgentId,
    policy: PreferencePolicy,
    group: &Group,
    reputations: &ReputationVector,
) -> f64 {
    if group.len() <= 1 {
        return 0.0;
    }
    let peers = group.members().filter(|&id| id != agent).map(|id| reputations[id]);
    let aggregate = match policy {
        PreferencePolicy::Average => {
            let (sum, count) = peers.fold((0.0, 0usize), |(sum, count), r| (sum + r, count + 1));
            sum / count as f64
        }
        PreferencePolicy::Minimum => peers.fold(f64::INFINITY, f64::min),
        PreferencePolicy::Maximum => peers.fold(f64::NEG_INFINITY, f64::max),
    };
    aggregate / (group.len() - 1) as f64
}

/// Rank every group of `partition` for `agent`, least preferred first.
///
/// The sort is stable: groups with equal value keep partition order, so the
/// last entry is the most preferred group.
pub fn rank_groups(
    agent: AgentId,
    policy: PreferencePolicy,
    partition: &Partition,
    reputations: &ReputationVector,
) -> Vec<Preference> {
    let mut ranking: Vec<Preference> = partition
        .groups()
        .iter()
        .enumerate()
        .map(|(group, members)| Preference {
            group,
            value: group_value(agent, policy, members, reputations),
        })
        .collect();
    ranking.sort_by(|a, b| a.value.total_cmp(&b.value));
    ranking
}

/// An agent's full ranking plus direct lookup of its value for any group
#[derive(Debug, Clone)]
pub struct AgentPreferences {
    ranking: Vec<Preference>,
    by_group: Vec<f64>,
}

impl AgentPreferences {
    fn new(ranking: Vec<Preference>) -> Self {
        let mut by_group = vec![0.0; ranking.len()];
        for preference in &ranking {
            by_group[preference.group] = preference.value;
        }
        Self { ranking, by_group }
    }

    /// Least preferred first
    pub fn ranking(&self) -> &[Preference] {
        &self.ranking
    }

    /// Index of the most preferred group
    pub fn top(&self) -> Option<usize> {
        self.ranking.last().map(|p| p.group)
    }

    pub fn value_of(&self, group: usize) -> f64 {
        self.by_group[group]
    }
}

/// Preferences of every agent over one candidate partition
#[derive(Debug, Clone)]
pub struct PreferenceProfile {
    preferences: BTreeMap<AgentId, AgentPreferences>,
}

impl PreferenceProfile {
    pub fn build(agents: &[Agent], partition: &Partition, reputations: &ReputationVector) -> Self {
        let preferences = agents
            .iter()
            .map(|agent| (agent.id(), AgentPreferences::new(agent.preferences(partition, reputations))))
            .collect();
        Self { preferences }
    }

    pub fn get(&self, id: AgentId) -> Option<&AgentPreferences> {
        self.preferences.get(&id)
    }

    /// Value `id` assigns to the group at index `group`.
    /// Panics if the agent is not part of the profile.
    pub fn value_of(&self, id: AgentId, group: usize) -> f64 {
        self.preferences[&id].value_of(group)
    }

    pub fn iter(&self) -> impl Iterator<Item = (AgentId, &AgentPreferences)> {
        self.preferences.iter().map(|(&id, prefs)| (id, prefs))
    }
}
