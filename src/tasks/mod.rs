//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside the cache.
//!
//! # Tasks
//! - Reclaimer: evicts expired entries at the configured sweep interval

mod reclaimer;

pub(crate) use reclaimer::ReclaimerHandle;
