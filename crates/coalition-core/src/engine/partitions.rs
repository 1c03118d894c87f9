//! Partition Enumeration
//!
//! Generates every set partition of a labeled universe through restricted
//! growth strings (RGS). `codeword[i]` is the 1-based group label of element
//! `i`; labels satisfy `codeword[0] == 1` and
//! `codeword[i] <= 1 + max(codeword[..i])`, so each partition has exactly one
//! codeword.
//!
//! Generation starts at the all-ones codeword (the grand coalition) and ends
//! at `1, 2, ..., n` (all singletons). The number of partitions is the Bell
//! number B(n), which grows faster than exponentially: B(10) = 115_975,
//! B(12) = 4_213_597, B(15) = 1_382_958_545. Full enumeration is the dominant
//! cost of a simulation round beyond about a dozen agents, which is what
//! [`bell_number`] and the search limit in the config are for.

use std::iter::FusedIterator;

use crate::components::{AgentId, Partition};
use crate::error::EngineError;

/// Bell number B(n), or `None` when the Bell triangle overflows `u128`.
///
/// The last row of the triangle reaches B(n + 1), so the cutoff is one
/// step conservative.
pub fn bell_number(n: usize) -> Option<u128> {
    let mut row: Vec<u128> = vec![1];
    for _ in 0..n {
        let mut next = Vec::with_capacity(row.len() + 1);
        next.push(*row.last()?);
        for &value in &row {
            let sum = next.last()?.checked_add(value)?;
            next.push(sum);
        }
        row = next;
    }
    row.first().copied()
}

/// Lazy iterator over all partitions of a set of agents.
///
/// Consumers may stop at any point; nothing past the current codeword is
/// computed.
#[derive(Debug, Clone)]
pub struct Partitions {
    labels: Vec<AgentId>,
    codeword: Vec<usize>,
    started: bool,
    exhausted: bool,
}

impl Partitions {
    /// Partitions of `{0, ..., n - 1}`.
    pub fn new(n: usize) -> Result<Self, EngineError> {
        let labels = (0..n).map(|i| AgentId(i as u32)).collect();
        Self::over(labels)
    }

    /// Partitions of the given agents. Element `i` of each codeword maps to `labels[i]`.
    pub fn over(labels: Vec<AgentId>) -> Result<Self, EngineError> {
        if labels.is_empty() {
            return Err(EngineError::EmptyUniverse);
        }
        Ok(Self {
            codeword: vec![1; labels.len()],
            labels,
            started: false,
            exhausted: false,
        })
    }

    /// Size of the universe being partitioned
    pub fn universe_size(&self) -> usize {
        self.labels.len()
    }

    /// Step to the next codeword and lend it without building a `Partition`.
    pub fn next_codeword(&mut self) -> Option<&[usize]> {
        if self.exhausted {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.codeword.as_slice());
        }
        if self.advance() {
            Some(self.codeword.as_slice())
        } else {
            self.exhausted = true;
            None
        }
    }

    /// Successor rule: find the rightmost position that can legally grow,
    /// increment it, and reset everything to its right to 1.
    fn advance(&mut self) -> bool {
        let n = self.codeword.len();
        let mut index = n - 1;
        loop {
            if index == 0 {
                return false;
            }
            let prefix_max = self.codeword[..index].iter().copied().max().unwrap_or(0);
            let current = self.codeword[index];
            if prefix_max > n || current > prefix_max || current >= n {
                self.codeword[index] = 1;
                index -= 1;
            } else {
                self.codeword[index] += 1;
                return true;
            }
        }
    }
}

impl Iterator for Partitions {
    type Item = Partition;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_codeword()?;
        Some(Partition::from_rgs(&self.codeword, &self.labels))
    }
}

impl FusedIterator for Partitions {}
