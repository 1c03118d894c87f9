//! World Registry
//!
//! The authoritative, ordered collection of agents plus the review matrix
//! projected from their ledgers.

use std::collections::HashMap;

use crate::components::{Agent, AgentId, Group};
use crate::config::ReputationConfig;
use crate::engine::reputation::{ReputationVector, ReviewMatrix, TrustMatrix};

/// Registry of every agent in insertion order
#[derive(Debug, Clone)]
pub struct World {
    agents: Vec<Agent>,
    index: HashMap<AgentId, usize>,
    reviews: ReviewMatrix,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            agents: Vec::new(),
            index: HashMap::new(),
            reviews: ReviewMatrix::from_agents(&[]),
        }
    }

    /// Register agents. Registry order is insertion order and never changes.
    pub fn add_agents(&mut self, agents: impl IntoIterator<Item = Agent>) {
        for agent in agents {
            debug_assert!(
                !self.index.contains_key(&agent.id()),
                "Agent ids must be unique."
            );
            self.index.insert(agent.id(), self.agents.len());
            self.agents.push(agent);
        }
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Agent ids in registry order
    pub fn ids(&self) -> Vec<AgentId> {
        self.agents.iter().map(Agent::id).collect()
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.index.get(&id).map(|&i| &self.agents[i])
    }

    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        let i = *self.index.get(&id)?;
        Some(&mut self.agents[i])
    }

    /// Members of `group`, in registry order
    pub fn agents_in<'a>(&'a self, group: &'a Group) -> impl Iterator<Item = &'a Agent> + 'a {
        self.agents.iter().filter(move |a| group.contains(a.id()))
    }

    /// Rebuild the review matrix from the agents' ledgers
    pub fn fetch_reviews(&mut self) {
        self.reviews = ReviewMatrix::from_agents(&self.agents);
    }

    /// Review matrix as of the last `fetch_reviews`
    pub fn reviews(&self) -> &ReviewMatrix {
        &self.reviews
    }

    pub fn normalized_reviews(&self) -> TrustMatrix {
        self.reviews.normalize()
    }

    /// Global reputations from the current review matrix
    pub fn reputations(&self, config: &ReputationConfig) -> ReputationVector {
        self.normalized_reviews().reputations(config)
    }

    /// Good reviews over all reviews given by anyone; 0 when nobody reviewed yet
    pub fn success_rate(&self) -> f64 {
        let (good, total) = self
            .agents
            .iter()
            .flat_map(|a| a.reviews().values())
            .fold((0u64, 0u64), |(good, total), r| (good + u64::from(r.good), total + r.total()));
        if total == 0 {
            0.0
        } else {
            good as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{PreferencePolicy, ReviewPolicy};

    fn world(n: u32) -> World {
        let mut world = World::new();
        world.add_agents(
            (0..n).map(|i| Agent::new(AgentId(i), 0.1 * i as f64, ReviewPolicy::Optimist, PreferencePolicy::Average)),
        );
        world.fetch_reviews();
        world
    }

    #[test]
    fn test_registry_lookup() {
        let world = world(3);
        assert_eq!(world.agent_count(), 3);
        assert_eq!(world.ids(), vec![AgentId(0), AgentId(1), AgentId(2)]);
        assert_eq!(world.agent(AgentId(2)).map(Agent::id), Some(AgentId(2)));
        assert!(world.agent(AgentId(7)).is_none());

        let group: Group = [AgentId(2), AgentId(0)].into_iter().collect();
        let members: Vec<AgentId> = world.agents_in(&group).map(Agent::id).collect();
        assert_eq!(members, vec![AgentId(0), AgentId(2)]);
    }

    #[test]
    fn test_matrix_is_a_projection() {
        let mut world = world(3);
        world.agent_mut(AgentId(0)).unwrap().review(AgentId(1), 1);
        assert_eq!(world.reviews()[(0, 1)], 0, "stale until fetched");

        world.fetch_reviews();
        assert_eq!(world.reviews()[(0, 1)], 1);
        assert_eq!(world.reviews().to_rows(), vec![vec![0, 1, 0], vec![0, 0, 0], vec![0, 0, 0]]);
    }

    #[test]
    fn test_success_rate() {
        let mut world = world(3);
        assert_eq!(world.success_rate(), 0.0);

        world.agent_mut(AgentId(0)).unwrap().review(AgentId(1), 1);
        world.agent_mut(AgentId(0)).unwrap().review(AgentId(2), 1);
        world.agent_mut(AgentId(1)).unwrap().review(AgentId(2), 1);
        world.agent_mut(AgentId(2)).unwrap().review(AgentId(0), -1);
        assert_eq!(world.success_rate(), 0.75);
    }

    #[test]
    fn test_reputations_sum_to_one() {
        let mut world = world(4);
        world.agent_mut(AgentId(0)).unwrap().review(AgentId(3), 2);
        world.agent_mut(AgentId(1)).unwrap().review(AgentId(3), 1);
        world.agent_mut(AgentId(3)).unwrap().review(AgentId(0), -1);
        world.fetch_reviews();

        let reputations = world.reputations(&ReputationConfig::default());
        assert_eq!(reputations.len(), 4);
        assert!((reputations.total() - 1.0).abs() < 1e-9);
        assert!(reputations[AgentId(3)] > reputations[AgentId(1)]);
    }
}
