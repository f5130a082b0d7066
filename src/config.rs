//! Configuration Module
//!
//! Handles loading the load driver configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::driver::Scenario;
use crate::error::Result;

/// Load driver configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Index allocation hint
    pub capacity: usize,
    /// Accepted and passed through to the cache; not enforced
    pub strict_capacity: bool,
    /// Entry time-to-live in milliseconds (0 = never expire)
    pub ttl_ms: u64,
    /// Reclaimer interval in milliseconds (0 = no reclaimer)
    pub sweep_interval_ms: u64,
    /// Number of keys the scenario writes or reads
    pub sample_size: u64,
    /// Worker threads for the multi-threaded scenarios
    pub workers: usize,
    /// Workload to run
    pub scenario: Scenario,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Index allocation hint (default: 100)
    /// - `CACHE_STRICT_CAPACITY` - Strict capacity flag (default: false)
    /// - `CACHE_TTL_MS` - Entry TTL in milliseconds (default: 0)
    /// - `CACHE_SWEEP_INTERVAL_MS` - Reclaimer interval in milliseconds (default: 1000)
    /// - `LOAD_SAMPLE_SIZE` - Keys per scenario (default: 1000000)
    /// - `LOAD_WORKERS` - Worker threads (default: 4)
    /// - `LOAD_SCENARIO` - single, concurrent, read-single or read-multi (default: read-multi)
    ///
    /// Unparseable numbers fall back to their defaults; an unknown scenario is an error.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Config::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let parse = |name: &str| lookup(name).map(|v| v.trim().to_string());

        let scenario = match parse("LOAD_SCENARIO") {
            Some(name) => name.parse()?,
            None => defaults.scenario,
        };

        Ok(Self {
            capacity: parse_or(parse("CACHE_CAPACITY"), defaults.capacity),
            strict_capacity: parse_or(parse("CACHE_STRICT_CAPACITY"), defaults.strict_capacity),
            ttl_ms: parse_or(parse("CACHE_TTL_MS"), defaults.ttl_ms),
            sweep_interval_ms: parse_or(
                parse("CACHE_SWEEP_INTERVAL_MS"),
                defaults.sweep_interval_ms,
            ),
            sample_size: parse_or(parse("LOAD_SAMPLE_SIZE"), defaults.sample_size),
            workers: parse_or(parse("LOAD_WORKERS"), defaults.workers),
            scenario,
        })
    }

    /// Cache construction parameters derived from this config.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new(
            self.capacity,
            self.strict_capacity,
            Duration::from_millis(self.ttl_ms),
            Duration::from_millis(self.sweep_interval_ms),
        )
    }
}

fn parse_or<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 100,
            strict_capacity: false,
            ttl_ms: 0,
            sweep_interval_ms: 1000,
            sample_size: 1_000_000,
            workers: 4,
            scenario: Scenario::ReadMulti,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.capacity, 100);
        assert!(!config.strict_capacity);
        assert_eq!(config.ttl_ms, 0);
        assert_eq!(config.sweep_interval_ms, 1000);
        assert_eq!(config.sample_size, 1_000_000);
        assert_eq!(config.workers, 4);
        assert_eq!(config.scenario, Scenario::ReadMulti);
    }

    #[test]
    fn test_config_empty_lookup_uses_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.capacity, 100);
        assert_eq!(config.scenario, Scenario::ReadMulti);
    }

    #[test]
    fn test_config_from_lookup() {
        let config = Config::from_lookup(lookup_from(&[
            ("CACHE_CAPACITY", "500"),
            ("CACHE_STRICT_CAPACITY", "true"),
            ("CACHE_TTL_MS", "10000"),
            ("CACHE_SWEEP_INTERVAL_MS", "250"),
            ("LOAD_SAMPLE_SIZE", " 42 "),
            ("LOAD_WORKERS", "8"),
            ("LOAD_SCENARIO", "concurrent"),
        ]))
        .unwrap();

        assert_eq!(config.capacity, 500);
        assert!(config.strict_capacity);
        assert_eq!(config.sample_size, 42);
        assert_eq!(config.workers, 8);
        assert_eq!(config.scenario, Scenario::Concurrent);

        let cache_config = config.cache_config();
        assert_eq!(cache_config.ttl, Duration::from_secs(10));
        assert_eq!(cache_config.sweep_interval, Duration::from_millis(250));
        assert!(cache_config.strict_capacity);
    }

    #[test]
    fn test_config_bad_numbers_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("CACHE_CAPACITY", "lots"),
            ("LOAD_WORKERS", "-1"),
        ]))
        .unwrap();

        assert_eq!(config.capacity, 100);
        assert_eq!(config.workers, 4);
    }

    #[test]
    fn test_config_unknown_scenario_is_error() {
        let result = Config::from_lookup(lookup_from(&[("LOAD_SCENARIO", "write-only")]));
        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
    }
}
