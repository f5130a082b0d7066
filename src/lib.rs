//! TTL Cache - A thread-safe in-process key/value cache
//!
//! Entries expire by age, are evicted in write order, and can be reclaimed by
//! an optional background task.

pub mod cache;
pub mod config;
pub mod driver;
pub mod error;
mod tasks;

pub use cache::{Cache, CacheConfig, CacheStats, Clock, MockClock, SystemClock};
pub use config::Config;
pub use error::{CacheError, Result};
