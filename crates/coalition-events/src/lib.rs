//! Shared report types for the coalition simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! The engine produces them; reporting layers consume them.

pub mod report;

pub use report::{
    Convergence, FinalReport, RoundReport, ScoredAgent, TerminationReason,
};
