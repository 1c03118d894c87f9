//! Partition Components
//!
//! A partition splits the agent population into disjoint, non-empty groups
//! whose union is the whole population.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::components::agent::AgentId;

/// A coalition: a non-empty set of agent ids
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Group(BTreeSet<AgentId>);

impl Group {
    pub fn new(members: impl IntoIterator<Item = AgentId>) -> Self {
        Self(members.into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.0.contains(&id)
    }

    /// Members in ascending id order
    pub fn members(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.0.iter().copied()
    }

    fn first(&self) -> Option<AgentId> {
        self.0.first().copied()
    }
}

impl FromIterator<AgentId> for Group {
    fn from_iter<I: IntoIterator<Item = AgentId>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, id) in self.members().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", id)?;
        }
        write!(f, ")")
    }
}

/// A set of disjoint groups covering every agent exactly once.
///
/// Groups are kept in canonical order: sorted by their smallest member.
/// Two partitions of the same agents are equal exactly when they group the
/// agents the same way.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Partition {
    groups: Vec<Group>,
}

impl Partition {
    pub fn new(groups: Vec<Group>) -> Self {
        debug_assert!(
            groups.iter().all(|g| !g.is_empty()),
            "Groups of a partition must be non-empty."
        );
        debug_assert!(
            {
                let total: usize = groups.iter().map(Group::len).sum();
                let distinct: BTreeSet<AgentId> = groups.iter().flat_map(|g| g.members()).collect();
                total == distinct.len()
            },
            "Groups of a partition must be disjoint."
        );
        let mut groups = groups;
        groups.sort_by_key(Group::first);
        Self { groups }
    }

    /// Build a partition from a restricted growth string.
    ///
    /// `codeword[i]` is the 1-based group label of `labels[i]`.
    pub fn from_rgs(codeword: &[usize], labels: &[AgentId]) -> Self {
        debug_assert_eq!(codeword.len(), labels.len(), "One label per codeword position.");
        let group_count = codeword.iter().copied().max().unwrap_or(0);
        let mut members: Vec<BTreeSet<AgentId>> = vec![BTreeSet::new(); group_count];
        for (&label, &id) in codeword.iter().zip(labels) {
            members[label - 1].insert(id);
        }
        Self::new(members.into_iter().map(Group).collect())
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn group(&self, index: usize) -> &Group {
        &self.groups[index]
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Number of agents covered
    pub fn agent_count(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }

    /// Index of the group containing `id`
    pub fn group_of(&self, id: AgentId) -> Option<usize> {
        self.groups.iter().position(|g| g.contains(id))
    }

    /// True for the grand coalition and for all-singletons.
    /// The stability search never retains those.
    pub fn is_degenerate(&self) -> bool {
        self.len() <= 1 || self.len() >= self.agent_count()
    }

    pub fn to_list(&self) -> Vec<Vec<u32>> {
        self.groups
            .iter()
            .map(|g| g.members().map(|id| id.0).collect())
            .collect()
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, group) in self.groups.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", group)?;
        }
        Ok(())
    }
}
