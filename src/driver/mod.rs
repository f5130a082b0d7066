//! Load Driver Module
//!
//! Workloads that exercise a cache from many threads and report throughput.
//!
//! # Scenarios
//! - `single` - sequential writes
//! - `concurrent` - parallel writes over disjoint key ranges
//! - `read-single` - populate, then sequential reads
//! - `read-multi` - populate, then parallel reads

mod report;
mod scenarios;

pub use report::RunReport;
pub use scenarios::{run_scenario, Scenario};
