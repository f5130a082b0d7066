//! Run Report
//!
//! Serializable summary of one load scenario.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::CacheStats;
use crate::driver::Scenario;

/// Timings and cache state after a scenario run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Scenario that was executed
    pub scenario: Scenario,
    /// Number of distinct keys written or read
    pub sample_size: u64,
    /// Worker threads used for the timed phase
    pub workers: usize,
    /// Time spent populating before a read scenario
    #[serde(skip_serializing_if = "Option::is_none")]
    pub populate_secs: Option<f64>,
    /// Time spent in the timed phase
    pub run_secs: f64,
    /// Operations per second during the timed phase
    pub ops_per_sec: f64,
    /// Cache length when the run finished
    pub final_len: usize,
    /// Cache counters when the run finished
    pub stats: CacheStats,
    /// Wall-clock start of the run
    pub started_at: DateTime<Utc>,
}

impl RunReport {
    /// Creates a report, deriving throughput from the timed phase.
    pub fn new(
        scenario: Scenario,
        sample_size: u64,
        workers: usize,
        populate_secs: Option<f64>,
        run_secs: f64,
        stats: CacheStats,
        started_at: DateTime<Utc>,
    ) -> Self {
        let ops_per_sec = if run_secs > 0.0 {
            sample_size as f64 / run_secs
        } else {
            0.0
        };

        Self {
            scenario,
            sample_size,
            workers,
            populate_secs,
            run_secs,
            ops_per_sec,
            final_len: stats.total_entries,
            stats,
            started_at,
        }
    }
}
