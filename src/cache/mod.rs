//! Cache Module
//!
//! Provides the in-memory cache with age-based expiration.

mod age_list;
mod clock;
mod config;
mod entry;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, MockClock, SystemClock};
pub use config::CacheConfig;
pub use stats::CacheStats;
pub use store::Cache;

// Storage internals stay behind the `Cache` API
pub(crate) use age_list::AgeIndex;
pub(crate) use entry::Entry;
pub(crate) use store::Shared;
