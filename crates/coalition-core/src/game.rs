//! Simulation Loop
//!
//! Drives the round cycle: search for a stable partition, let every group
//! work, collect the reviews, recompute reputations, and start over. The loop
//! ends when no non-degenerate partition is stable or the round limit is hit.

use std::collections::BTreeMap;

use coalition_events::{FinalReport, RoundReport, TerminationReason};
use rand::rngs::SmallRng;
use rand::seq::IteratorRandom;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::components::{AgentId, Partition};
use crate::config::{ReputationConfig, SimulationConfig};
use crate::error::EngineError;
use crate::output;
use crate::setup::AgentFactory;
use crate::engine::partitions::Partitions;
use crate::engine::reputation::ReputationVector;
use crate::engine::stability::Stability;
use crate::world::World;

/// Where the loop currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Searching,
    Playing,
    Reviewing,
    Terminated,
}

/// One simulation: the agent registry plus the round state machine
pub struct Game {
    world: World,
    stability: Stability,
    reputation: ReputationConfig,
    max_rounds: Option<u64>,
    rng: SmallRng,
    phase: Phase,
    round: u64,
    coalitions: Option<Partition>,
    reputations: ReputationVector,
    termination: Option<TerminationReason>,
}

impl Game {
    /// Validate `config`, create its agents and prime the review matrix.
    ///
    /// Fails before any agent exists when the configuration is invalid or
    /// the partition search is too large under `LimitAction::Reject`.
    pub fn new(config: &SimulationConfig) -> Result<Self, EngineError> {
        config.validate()?;
        if !config.search.admit(config.agents)? {
            warn!(
                agents = config.agents,
                limit = config.search.partition_limit,
                "Partition search exceeds the configured limit; continuing anyway"
            );
        }

        let mut rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        let mut factory = AgentFactory::new(config.review_policy, config.preference_policy);
        let mut world = World::new();
        world.add_agents(factory.create(config.agents, &mut rng));

        info!(
            agents = config.agents,
            review_policy = %config.review_policy,
            preference_policy = %config.preference_policy,
            stability = %config.stability,
            seed = ?config.seed,
            "Simulation created"
        );

        Ok(Self::with_world(world, config, rng))
    }

    /// Build a game around an existing registry, skipping agent creation
    pub fn with_world(mut world: World, config: &SimulationConfig, rng: SmallRng) -> Self {
        world.fetch_reviews();
        let reputations = world.reputations(&config.reputation);
        Self {
            world,
            stability: config.stability,
            reputation: config.reputation.clone(),
            max_rounds: config.max_rounds,
            rng,
            phase: Phase::Searching,
            round: 0,
            coalitions: None,
            reputations,
            termination: None,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Rounds played so far
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Partition retained by the last search
    pub fn coalitions(&self) -> Option<&Partition> {
        self.coalitions.as_ref()
    }

    /// Reputations as of the last review collection
    pub fn reputations(&self) -> &ReputationVector {
        &self.reputations
    }

    pub fn termination(&self) -> Option<TerminationReason> {
        self.termination
    }

    /// Every partition of the registry except the grand coalition and the
    /// all-singletons split, in enumeration order
    pub fn candidates(&self) -> Result<impl Iterator<Item = Partition>, EngineError> {
        Ok(Partitions::over(self.world.ids())?.filter(|p| !p.is_degenerate()))
    }

    /// Search every candidate against the current reputations.
    ///
    /// When several candidates are stable the last one enumerated is kept.
    pub fn stable_partition(&self) -> Result<Option<Partition>, EngineError> {
        let agents = self.world.agents();
        let mut tested = 0usize;
        let mut stable = None;
        for candidate in self.candidates()? {
            tested += 1;
            if self.stability.evaluate(agents, &candidate, &self.reputations) {
                stable = Some(candidate);
            }
        }
        debug!(
            tested,
            found = stable.is_some(),
            stability = %self.stability,
            "Partition search finished"
        );
        Ok(stable)
    }

    /// Uniform pick among all partitions of the registry, degenerate ones included
    pub fn random_partition(&mut self) -> Result<Partition, EngineError> {
        Partitions::over(self.world.ids())?
            .choose(&mut self.rng)
            .ok_or(EngineError::EmptyUniverse)
    }

    /// Let every group of `partition` work, then have each member review the others
    pub fn play(&mut self, partition: &Partition) {
        for group in partition.groups() {
            let outcomes: BTreeMap<AgentId, bool> = self
                .world
                .agents_in(group)
                .map(|agent| (agent.id(), agent.work(&mut self.rng)))
                .collect();
            debug!(group = %group, ?outcomes, "Group worked");

            for &id in outcomes.keys() {
                if let Some(agent) = self.world.agent_mut(id) {
                    agent.request_reviews(&outcomes);
                }
            }
        }
    }

    /// Advance one full round.
    ///
    /// Returns `None` once the loop has terminated.
    pub fn step(&mut self) -> Result<Option<RoundReport>, EngineError> {
        if self.phase == Phase::Terminated {
            return Ok(None);
        }
        if self.max_rounds.is_some_and(|limit| self.round >= limit) {
            self.terminate(TerminationReason::RoundLimit);
            return Ok(None);
        }

        self.phase = Phase::Searching;
        self.coalitions = self.stable_partition()?;
        let Some(partition) = self.coalitions.clone() else {
            self.terminate(TerminationReason::NoStablePartition);
            return Ok(None);
        };

        self.phase = Phase::Playing;
        self.play(&partition);

        self.phase = Phase::Reviewing;
        self.world.fetch_reviews();
        self.reputations = self.world.reputations(&self.reputation);
        self.round += 1;

        let report = output::round_report(self.round, &self.world, &partition, &self.reputations);
        info!(
            round = self.round,
            coalitions = %partition,
            success_rate = report.success_rate,
            good_placement = report.good_placement,
            "Round played"
        );
        self.phase = Phase::Searching;
        Ok(Some(report))
    }

    /// Play rounds until the loop terminates
    pub fn run(&mut self) -> Result<FinalReport, EngineError> {
        let mut rounds = Vec::new();
        while let Some(report) = self.step()? {
            rounds.push(report);
        }
        Ok(self.final_report(rounds))
    }

    /// Snapshot of the current state, carrying `rounds` as the round history.
    ///
    /// The termination reason is only set once the loop has terminated.
    pub fn final_report(&self, rounds: Vec<RoundReport>) -> FinalReport {
        output::final_report(
            &self.world,
            &self.reputations,
            rounds,
            self.round,
            self.termination,
        )
    }

    fn terminate(&mut self, reason: TerminationReason) {
        info!(rounds = self.round, ?reason, "Simulation terminated");
        self.phase = Phase::Terminated;
        self.termination = Some(reason);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Agent, PreferencePolicy, ReviewPolicy};

    fn config(stability: Stability) -> SimulationConfig {
        SimulationConfig {
            stability,
            seed: Some(7),
            ..Default::default()
        }
    }

    fn fixed_world(reliabilities: &[f64], review_policy: ReviewPolicy) -> World {
        let mut factory = AgentFactory::new(review_policy, PreferencePolicy::Average);
        let mut world = World::new();
        world.add_agents(reliabilities.iter().map(|&r| factory.create_with_reliability(r)));
        world
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let bad = SimulationConfig { agents: 2, ..Default::default() };
        assert!(matches!(Game::new(&bad), Err(EngineError::Config(_))));

        let huge = SimulationConfig { agents: 30, ..Default::default() };
        assert!(matches!(Game::new(&huge), Err(EngineError::EnumerationLimit { .. })));
    }

    #[test]
    fn test_initial_state() {
        let game = Game::new(&config(Stability::Nash)).unwrap();
        assert_eq!(game.phase(), Phase::Searching);
        assert_eq!(game.round(), 0);
        assert_eq!(game.world().agent_count(), 3);
        assert!(game.world().reviews().to_rows().iter().flatten().all(|&v| v == 0));
        assert!((game.reputations().total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_three_agent_candidates() {
        let game = Game::new(&config(Stability::Nash)).unwrap();
        let candidates: Vec<Partition> = game.candidates().unwrap().collect();
        assert_eq!(candidates.len(), 3);
        assert!(candidates.iter().all(|p| p.len() == 2));
    }

    #[test]
    fn test_random_partition_covers_everyone() {
        let mut game = Game::new(&config(Stability::Nash)).unwrap();
        for _ in 0..20 {
            let p = game.random_partition().unwrap();
            assert_eq!(p.agent_count(), 3);
        }
    }

    #[test]
    fn test_play_records_reviews() {
        let world = fixed_world(&[1.0, 1.0, 1.0, 1.0], ReviewPolicy::Optimist);
        let mut game = Game::with_world(world, &config(Stability::Nash), SmallRng::seed_from_u64(1));
        let partition = Partition::from_rgs(&[1, 1, 2, 2], &game.world().ids());
        game.play(&partition);

        let a0 = game.world().agent(AgentId(0)).unwrap();
        assert_eq!(a0.reviews()[&AgentId(1)].good, 1);
        assert!(!a0.reviews().contains_key(&AgentId(2)));
        let a3 = game.world().agent(AgentId(3)).unwrap();
        assert_eq!(a3.reviews()[&AgentId(2)].good, 1);
    }

    #[test]
    fn test_unreliable_pessimists_penalize() {
        let world = fixed_world(&[0.0, 0.0, 0.0], ReviewPolicy::Pessimist);
        let mut game = Game::with_world(world, &config(Stability::Nash), SmallRng::seed_from_u64(1));
        let partition = Partition::from_rgs(&[1, 1, 1], &game.world().ids());
        game.play(&partition);

        let total_bad: u32 = game
            .world()
            .agents()
            .iter()
            .flat_map(|a| a.reviews().values())
            .map(|r| r.bad)
            .sum();
        assert!(total_bad > 0);
    }

    #[test]
    fn test_round_limit() {
        let mut cfg = config(Stability::Is);
        cfg.max_rounds = Some(0);
        let mut game = Game::new(&cfg).unwrap();
        assert!(game.step().unwrap().is_none());
        assert_eq!(game.phase(), Phase::Terminated);
        assert_eq!(game.termination(), Some(TerminationReason::RoundLimit));
        assert!(game.step().unwrap().is_none());
    }

    #[test]
    fn test_report_before_termination_has_no_reason() {
        let mut cfg = config(Stability::Is);
        cfg.max_rounds = Some(3);
        let mut game = Game::new(&cfg).unwrap();
        let first = game.step().unwrap();
        assert!(first.is_some());
        assert_ne!(game.phase(), Phase::Terminated);

        let report = game.final_report(first.into_iter().collect());
        assert_eq!(report.termination, None);
        assert_eq!(report.rounds_played, 1);
    }

    #[test]
    fn test_no_stable_partition_terminates() {
        // Under the average policy a singleton always prefers joining a pair
        let mut game = Game::new(&config(Stability::Nash)).unwrap();
        let report = game.run().unwrap();
        assert_eq!(report.termination, Some(TerminationReason::NoStablePartition));
        assert_eq!(report.rounds_played, 0);
        assert!(report.rounds.is_empty());
    }

    #[test]
    fn test_agents_are_reviewed_only_by_groupmates() {
        let world = fixed_world(&[0.9, 0.1, 0.5, 0.7], ReviewPolicy::Optimist);
        let mut cfg = config(Stability::Is);
        cfg.max_rounds = Some(1);
        let mut game = Game::with_world(world, &cfg, SmallRng::seed_from_u64(3));
        if let Some(report) = game.step().unwrap() {
            let partition = game.coalitions().unwrap();
            for agent in game.world().agents() {
                let own = partition.group_of(agent.id()).unwrap();
                for target in agent.reviews().keys() {
                    assert_eq!(partition.group_of(*target), Some(own));
                    assert_ne!(*target, agent.id());
                }
            }
            assert_eq!(report.round, 1);
        }
        assert!(game.step().unwrap().is_none());
        assert!(game.round() <= 1);
    }

    #[test]
    fn test_stable_partition_matches_evaluate() {
        let world = fixed_world(&[0.2, 0.4, 0.6, 0.8], ReviewPolicy::Optimist);
        let game = Game::with_world(world, &config(Stability::Is), SmallRng::seed_from_u64(0));
        let found = game.stable_partition().unwrap();
        let last = game
            .candidates()
            .unwrap()
            .filter(|p| Stability::Is.evaluate(game.world().agents(), p, game.reputations()))
            .last();
        assert_eq!(found, last);
    }

    #[test]
    fn test_agent_ids_start_at_zero() {
        let game = Game::new(&config(Stability::Nash)).unwrap();
        let ids: Vec<u32> = game.world().ids().iter().map(|id| id.0).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        let _: &Agent = game.world().agent(AgentId(2)).unwrap();
    }
}
