//! Load Scenarios
//!
//! Drives a cache with sequential or multi-threaded write and read workloads.

use std::fmt;
use std::str::FromStr;
use std::thread;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;
use tracing::info;

use crate::cache::Cache;
use crate::driver::RunReport;
use crate::error::CacheError;

// == Scenario ==
/// Workload shape exercised by the load driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    /// One thread writes every key
    Single,
    /// Worker threads write disjoint key ranges
    Concurrent,
    /// Populate, then one thread reads every key
    ReadSingle,
    /// Populate, then worker threads read disjoint key ranges
    ReadMulti,
}

impl Scenario {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Single => "single",
            Scenario::Concurrent => "concurrent",
            Scenario::ReadSingle => "read-single",
            Scenario::ReadMulti => "read-multi",
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scenario {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(Scenario::Single),
            "concurrent" => Ok(Scenario::Concurrent),
            "read-single" => Ok(Scenario::ReadSingle),
            "read-multi" => Ok(Scenario::ReadMulti),
            other => Err(CacheError::InvalidConfig(format!(
                "unknown scenario '{}', expected one of: single, concurrent, read-single, read-multi",
                other
            ))),
        }
    }
}

// == Run Scenario ==
/// Runs `scenario` against `cache` and reports timings.
///
/// Keys and values are `0..sample_size`. Blocks the calling thread until
/// every worker has finished.
pub fn run_scenario(
    cache: &Cache<u64, u64>,
    scenario: Scenario,
    sample_size: u64,
    workers: usize,
) -> RunReport {
    let workers = workers.max(1);
    let started_at = Utc::now();
    info!(
        "Running scenario {} with {} keys and {} workers",
        scenario, sample_size, workers
    );

    let populate_secs = match scenario {
        Scenario::ReadSingle | Scenario::ReadMulti => {
            let start = Instant::now();
            write_range(cache, 0, 1, sample_size);
            let secs = start.elapsed().as_secs_f64();
            info!("Populated {} keys in {:.3}s", sample_size, secs);
            Some(secs)
        }
        Scenario::Single | Scenario::Concurrent => None,
    };

    let start = Instant::now();
    match scenario {
        Scenario::Single => write_range(cache, 0, 1, sample_size),
        Scenario::Concurrent => fan_out(cache, workers, sample_size, write_range),
        Scenario::ReadSingle => read_range(cache, 0, 1, sample_size),
        Scenario::ReadMulti => fan_out(cache, workers, sample_size, read_range),
    }
    let run_secs = start.elapsed().as_secs_f64();

    let report = RunReport::new(
        scenario,
        sample_size,
        workers,
        populate_secs,
        run_secs,
        cache.stats(),
        started_at,
    );
    info!(
        "Scenario {} finished in {:.3}s ({:.0} ops/s)",
        scenario, report.run_secs, report.ops_per_sec
    );
    report
}

/// Splits `0..sample_size` into `workers` interleaved strides, one thread each.
fn fan_out(
    cache: &Cache<u64, u64>,
    workers: usize,
    sample_size: u64,
    work: fn(&Cache<u64, u64>, u64, usize, u64),
) {
    thread::scope(|scope| {
        for worker in 0..workers {
            scope.spawn(move || work(cache, worker as u64, workers, sample_size));
        }
    });
}

fn write_range(cache: &Cache<u64, u64>, first: u64, stride: usize, end: u64) {
    for i in (first..end).step_by(stride) {
        cache.set(i, i);
    }
}

fn read_range(cache: &Cache<u64, u64>, first: u64, stride: usize, end: u64) {
    for i in (first..end).step_by(stride) {
        let _ = cache.get(&i);
    }
}
