//! Report Output
//!
//! Turns world state into the report types consumed by the reporting layer.

use std::fs;
use std::path::Path;

use coalition_events::{FinalReport, RoundReport, ScoredAgent, TerminationReason};

use crate::components::{Agent, Partition};
use crate::engine::reputation::ReputationVector;
use crate::world::World;

/// Agents by ascending reliability; ties keep registry order
pub fn reliability_order(world: &World) -> Vec<ScoredAgent> {
    let mut order: Vec<ScoredAgent> = world
        .agents()
        .iter()
        .map(|a| ScoredAgent { agent_id: a.id().0, score: a.reliability() })
        .collect();
    order.sort_by(|a, b| a.score.total_cmp(&b.score));
    order
}

/// Number of ranks at which both orderings name the same agent
pub fn good_placement(reliability: &[ScoredAgent], reputation: &[ScoredAgent]) -> usize {
    reliability
        .iter()
        .zip(reputation)
        .filter(|(a, b)| a.agent_id == b.agent_id)
        .count()
}

/// Summary of a played round
pub fn round_report(
    round: u64,
    world: &World,
    partition: &Partition,
    reputations: &ReputationVector,
) -> RoundReport {
    let reputation_order = reputations.ascending();
    let reliability_order = reliability_order(world);
    RoundReport {
        round,
        coalitions: partition.to_list(),
        good_placement: good_placement(&reliability_order, &reputation_order),
        reputation_order,
        reliability_order,
        success_rate: world.success_rate(),
        convergence: reputations.convergence(),
    }
}

/// End-of-simulation state; `termination` is `None` while the loop still runs
pub fn final_report(
    world: &World,
    reputations: &ReputationVector,
    rounds: Vec<RoundReport>,
    rounds_played: u64,
    termination: Option<TerminationReason>,
) -> FinalReport {
    FinalReport {
        rounds_played,
        termination,
        agent_ids: world.ids().iter().map(|id| id.0).collect(),
        review_matrix: world.reviews().to_rows(),
        normalized_reviews: world.normalized_reviews().to_rows(),
        reputations: reputations
            .iter()
            .map(|(id, score)| ScoredAgent { agent_id: id.0, score })
            .collect(),
        reliabilities: world
            .agents()
            .iter()
            .map(|a: &Agent| ScoredAgent { agent_id: a.id().0, score: a.reliability() })
            .collect(),
        rounds,
    }
}

/// Write a final report as pretty JSON, creating parent directories as needed
pub fn write_report(report: &FinalReport, path: impl AsRef<Path>) -> std::io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let json = serde_json::to_string_pretty(report)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

    fs::write(path, json)
}
