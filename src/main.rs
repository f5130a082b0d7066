//! TTL Cache load driver
//!
//! Builds a cache from environment configuration, runs one load scenario
//! against it and prints the run report as JSON.

use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ttl_cache::driver::run_scenario;
use ttl_cache::{Cache, Config};

/// How long shutdown waits for the reclaimer to acknowledge a stop.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Main entry point for the load driver.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache and start its reclaimer
/// 4. Run the configured scenario on a blocking thread
/// 5. Print the report, or stop early on SIGINT/SIGTERM
/// 6. Stop the reclaimer and clear the cache
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ttl_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TTL cache load driver");

    let config = Config::from_env()?;
    info!(
        "Configuration loaded: capacity={}, ttl={}ms, sweep_interval={}ms, scenario={}, sample_size={}, workers={}",
        config.capacity,
        config.ttl_ms,
        config.sweep_interval_ms,
        config.scenario,
        config.sample_size,
        config.workers
    );

    let cache: Arc<Cache<u64, u64>> = Arc::new(Cache::with_reclaimer(config.cache_config())?);
    info!("Cache initialized");

    let run = tokio::task::spawn_blocking({
        let cache = Arc::clone(&cache);
        let config = config.clone();
        move || run_scenario(&cache, config.scenario, config.sample_size, config.workers)
    });

    let interrupted = tokio::select! {
        report = run => {
            let report = report?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            false
        }
        _ = shutdown_signal() => {
            warn!("Scenario interrupted before completion");
            true
        }
    };

    cache.shutdown(SHUTDOWN_TIMEOUT).await?;
    info!("Load driver shutdown complete");

    if interrupted {
        // Blocking workers cannot be cancelled and would hold the runtime open.
        std::process::exit(130);
    }
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
