//! Report Types
//!
//! Serialization structs for per-round and end-of-simulation reports.

use serde::{Deserialize, Serialize};

/// How the reputation power iteration ended
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Convergence {
    /// Number of power-iteration steps taken
    pub iterations: usize,
    /// False when the iteration cap was hit before reaching tolerance
    pub converged: bool,
    /// Euclidean norm of the last step
    pub residual: f64,
}

/// An agent id paired with a score (reputation or reliability)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredAgent {
    pub agent_id: u32,
    pub score: f64,
}

/// Summary of a single played round
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundReport {
    pub round: u64,
    /// Groups of the partition that was played, each sorted by agent id
    pub coalitions: Vec<Vec<u32>>,
    /// Agents sorted by ascending reputation
    pub reputation_order: Vec<ScoredAgent>,
    /// Agents sorted by ascending reliability
    pub reliability_order: Vec<ScoredAgent>,
    /// Good reviews over all reviews, across the whole population
    pub success_rate: f64,
    /// Positions where the reputation and reliability orderings agree
    pub good_placement: usize,
    pub convergence: Convergence,
}

impl RoundReport {
    /// Ids in ascending reputation order
    pub fn reputation_ids(&self) -> Vec<u32> {
        self.reputation_order.iter().map(|s| s.agent_id).collect()
    }

    /// Ids in ascending reliability order
    pub fn reliability_ids(&self) -> Vec<u32> {
        self.reliability_order.iter().map(|s| s.agent_id).collect()
    }
}

/// Why the simulation loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// No non-degenerate partition satisfied the stability predicate
    NoStablePartition,
    /// The configured round limit was reached
    RoundLimit,
}

/// End-of-simulation state handed to the reporting layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalReport {
    pub rounds_played: u64,
    /// Why the loop stopped; `None` for a report taken while it is still running
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination: Option<TerminationReason>,
    /// Agent ids in registry order; rows and columns of the matrices follow it
    pub agent_ids: Vec<u32>,
    /// Signed review matrix, entry [i][j] = good - bad as rated by i about j
    pub review_matrix: Vec<Vec<i64>>,
    /// Row-normalized review matrix
    pub normalized_reviews: Vec<Vec<f64>>,
    /// Final reputation of every agent, in registry order
    pub reputations: Vec<ScoredAgent>,
    /// Static reliability of every agent, in registry order
    pub reliabilities: Vec<ScoredAgent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rounds: Vec<RoundReport>,
}
