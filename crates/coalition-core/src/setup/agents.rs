//! Agent Creation
//!
//! Creates agents with random reliability and the configured policies.

use rand::Rng;

use crate::components::{Agent, AgentId, PreferencePolicy, ReviewPolicy};

/// Hands out agent ids in increasing order, starting at zero.
///
/// Each simulation owns its allocator, so ids restart at zero for every new
/// simulation and are never shared between two of them.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> AgentId {
        let id = AgentId(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far
    pub fn allocated(&self) -> u32 {
        self.next
    }
}

/// Builds agents that share the same review and preference policies
#[derive(Debug, Clone)]
pub struct AgentFactory {
    review_policy: ReviewPolicy,
    preference_policy: PreferencePolicy,
    ids: IdAllocator,
}

impl AgentFactory {
    pub fn new(review_policy: ReviewPolicy, preference_policy: PreferencePolicy) -> Self {
        Self {
            review_policy,
            preference_policy,
            ids: IdAllocator::new(),
        }
    }

    /// Create one agent with the given reliability
    pub fn create_with_reliability(&mut self, reliability: f64) -> Agent {
        Agent::new(self.ids.allocate(), reliability, self.review_policy, self.preference_policy)
    }

    /// Create `n` agents, drawing each reliability uniformly from [0, 1)
    pub fn create<R: Rng + ?Sized>(&mut self, n: usize, rng: &mut R) -> Vec<Agent> {
        (0..n)
            .map(|_| {
                let reliability = rng.gen::<f64>();
                self.create_with_reliability(reliability)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_ids_are_monotonic() {
        let mut factory = AgentFactory::new(ReviewPolicy::Pessimist, PreferencePolicy::Minimum);
        let mut rng = SmallRng::seed_from_u64(1);
        let first = factory.create(3, &mut rng);
        let second = factory.create(2, &mut rng);

        let ids: Vec<u32> = first.iter().chain(&second).map(|a| a.id().0).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        assert!(first.iter().all(|a| a.review_policy() == ReviewPolicy::Pessimist));
        assert!(first.iter().all(|a| a.preference_policy() == PreferencePolicy::Minimum));
        assert!(first.iter().all(|a| (0.0..1.0).contains(&a.reliability())));
    }

    #[test]
    fn test_new_factory_restarts_ids() {
        let mut rng = SmallRng::seed_from_u64(1);
        let mut a = AgentFactory::new(ReviewPolicy::Optimist, PreferencePolicy::Average);
        a.create(4, &mut rng);
        let mut b = AgentFactory::new(ReviewPolicy::Optimist, PreferencePolicy::Average);
        assert_eq!(b.create_with_reliability(0.3).id(), AgentId(0));
    }

    #[test]
    fn test_reliability_is_seeded() {
        let draw = |seed| {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut factory = AgentFactory::new(ReviewPolicy::Optimist, PreferencePolicy::Average);
            factory.create(5, &mut rng).iter().map(Agent::reliability).collect::<Vec<_>>()
        };
        assert_eq!(draw(42), draw(42));
        assert_ne!(draw(42), draw(43));
    }

    #[test]
    fn test_allocator_counts() {
        let mut ids = IdAllocator::new();
        ids.allocate();
        ids.allocate();
        assert_eq!(ids.allocated(), 2);
        assert_eq!(ids.allocate(), AgentId(2));
    }
}
