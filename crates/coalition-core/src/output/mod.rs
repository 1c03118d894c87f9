//! Output Generation
//!
//! Builds round and final reports, and writes them as JSON.

pub mod report;

pub use report::{final_report, good_placement, reliability_order, round_report, write_report};
