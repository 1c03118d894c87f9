//! Reputation System
//!
//! Projects agents' review ledgers into a signed review matrix, row-normalizes
//! it into local trust, and runs a damped power iteration (EigenTrust style)
//! to get a global reputation distribution.

use std::collections::HashMap;
use std::ops::Index;

use coalition_events::{Convergence, ScoredAgent};
use grid::Grid;
use tracing::{debug, warn};

use crate::components::{Agent, AgentId};
use crate::config::ReputationConfig;

/// Signed review matrix: entry `[(i, j)]` is good minus bad as rated by
/// agent `i` about agent `j`. Rows and columns follow registry order.
///
/// A read-only projection of the agents' ledgers, rebuilt every round.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewMatrix {
    ids: Vec<AgentId>,
    weights: Grid<i64>,
}

impl ReviewMatrix {
    /// Project the ledgers of `agents`, in the given order.
    pub fn from_agents(agents: &[Agent]) -> Self {
        let ids: Vec<AgentId> = agents.iter().map(Agent::id).collect();
        let index: HashMap<AgentId, usize> = ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        let n = ids.len();
        let mut weights = Grid::init(n, n, 0i64);
        for (row, agent) in agents.iter().enumerate() {
            for (target, review) in agent.reviews() {
                let col = index[target];
                weights[(row, col)] = review.net();
            }
        }
        Self { ids, weights }
    }

    pub fn from_rows(ids: Vec<AgentId>, rows: Vec<Vec<i64>>) -> Self {
        let n = ids.len();
        debug_assert_eq!(rows.len(), n, "The review matrix must be square.");
        let mut weights = Grid::init(n, n, 0i64);
        for (i, row) in rows.iter().enumerate() {
            debug_assert_eq!(row.len(), n, "The review matrix must be square.");
            for (j, &value) in row.iter().enumerate() {
                weights[(i, j)] = value;
            }
        }
        Self { ids, weights }
    }

    pub fn size(&self) -> usize {
        self.ids.len()
    }

    pub fn ids(&self) -> &[AgentId] {
        &self.ids
    }

    pub fn to_rows(&self) -> Vec<Vec<i64>> {
        (0..self.size())
            .map(|row| self.weights.iter_row(row).copied().collect())
            .collect()
    }

    /// Row-normalize into local trust.
    ///
    /// Negative entries count as zero. A row with no positive entry falls
    /// back to a uniform distribution over every other agent. With a single
    /// agent, that agent trusts itself.
    pub fn normalize(&self) -> TrustMatrix {
        let n = self.size();
        let mut trust = Grid::init(n, n, 0f64);
        for row in 0..n {
            let positive: i64 = self.weights.iter_row(row).map(|&w| w.max(0)).sum();
            if positive > 0 {
                for col in 0..n {
                    trust[(row, col)] = self.weights[(row, col)].max(0) as f64 / positive as f64;
                }
            } else if n == 1 {
                trust[(row, row)] = 1.0;
            } else {
                let share = 1.0 / (n - 1) as f64;
                for col in 0..n {
                    if col != row {
                        trust[(row, col)] = share;
                    }
                }
            }
        }
        TrustMatrix {
            ids: self.ids.clone(),
            trust,
        }
    }
}

impl Index<(usize, usize)> for ReviewMatrix {
    type Output = i64;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.weights[index]
    }
}

/// Row-stochastic local trust matrix
#[derive(Debug, Clone, PartialEq)]
pub struct TrustMatrix {
    ids: Vec<AgentId>,
    trust: Grid<f64>,
}

impl TrustMatrix {
    pub fn size(&self) -> usize {
        self.ids.len()
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        (0..self.size())
            .map(|row| self.trust.iter_row(row).copied().collect())
            .collect()
    }

    /// Damped power iteration towards the stationary trust distribution.
    ///
    /// Each step computes `t = (1 - alpha) * trust^T * r + alpha * p` with a
    /// uniform prior `p`, starting from `r = p`, and stops when `|t - r|` (Euclidean)
    /// drops below the tolerance. If `max_iterations` is reached first, the
    /// last vector is returned with `converged == false`.
    pub fn reputations(&self, config: &ReputationConfig) -> ReputationVector {
        let n = self.size();
        if n == 0 {
            return ReputationVector {
                ids: Vec::new(),
                scores: Vec::new(),
                position: HashMap::new(),
                convergence: Convergence { iterations: 0, converged: true, residual: 0.0 },
            };
        }

        let alpha = config.damping;
        let prior = 1.0 / n as f64;
        let mut current = vec![prior; n];
        let mut residual = f64::INFINITY;

        for iteration in 1..=config.max_iterations {
            let mut next = vec![0.0; n];
            for (row, &weight) in current.iter().enumerate() {
                if weight == 0.0 {
                    continue;
                }
                for (col, &t) in self.trust.iter_row(row).enumerate() {
                    next[col] += t * weight;
                }
            }
            for value in next.iter_mut() {
                *value = (1.0 - alpha) * *value + alpha * prior;
            }

            residual = next
                .iter()
                .zip(&current)
                .map(|(a, b)| (a - b) * (a - b))
                .sum::<f64>()
                .sqrt();

            if residual < config.tolerance {
                debug!(iterations = iteration, residual, "reputation converged");
                let convergence = Convergence { iterations: iteration, converged: true, residual };
                return ReputationVector::new(self.ids.clone(), next, convergence);
            }
            current = next;
        }

        warn!(
            max_iterations = config.max_iterations,
            residual,
            "reputation did not converge, using last iterate"
        );
        let convergence = Convergence {
            iterations: config.max_iterations,
            converged: false,
            residual,
        };
        ReputationVector::new(self.ids.clone(), current, convergence)
    }
}

impl Index<(usize, usize)> for TrustMatrix {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        &self.trust[index]
    }
}

/// Global reputation of every agent: a probability distribution in registry
/// order. Indexing with an unknown agent id panics.
#[derive(Debug, Clone)]
pub struct ReputationVector {
    ids: Vec<AgentId>,
    scores: Vec<f64>,
    position: HashMap<AgentId, usize>,
    convergence: Convergence,
}

impl ReputationVector {
    pub fn new(ids: Vec<AgentId>, scores: Vec<f64>, convergence: Convergence) -> Self {
        debug_assert_eq!(ids.len(), scores.len(), "One score per agent.");
        let position = ids.iter().enumerate().map(|(i, &id)| (id, i)).collect();
        Self { ids, scores, position, convergence }
    }

    /// Build a vector from explicit scores, marked as converged
    pub fn from_scores(entries: impl IntoIterator<Item = (AgentId, f64)>) -> Self {
        let (ids, scores) = entries.into_iter().unzip();
        Self::new(ids, scores, Convergence { iterations: 0, converged: true, residual: 0.0 })
    }

    pub fn get(&self, id: AgentId) -> Option<f64> {
        self.position.get(&id).map(|&i| self.scores[i])
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.scores.iter().sum()
    }

    pub fn convergence(&self) -> Convergence {
        self.convergence
    }

    /// (id, score) pairs in registry order
    pub fn iter(&self) -> impl Iterator<Item = (AgentId, f64)> + '_ {
        self.ids.iter().copied().zip(self.scores.iter().copied())
    }

    /// Agents by ascending reputation; ties keep registry order
    pub fn ascending(&self) -> Vec<ScoredAgent> {
        let mut order: Vec<ScoredAgent> = self
            .iter()
            .map(|(id, score)| ScoredAgent { agent_id: id.0, score })
            .collect();
        order.sort_by(|a, b| a.score.total_cmp(&b.score));
        order
    }
}

impl Index<AgentId> for ReputationVector {
    type Output = f64;

    fn index(&self, id: AgentId) -> &Self::Output {
        &self.scores[self.position[&id]]
    }
}
