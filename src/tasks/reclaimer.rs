//! Reclaimer Task
//!
//! Background task that periodically sweeps expired entries out of a cache.
//!
//! The task is stopped cooperatively through a `CancellationToken`: a sweep
//! in progress always completes before the loop notices the request.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cache::{Clock, Shared};
use crate::error::{CacheError, Result};

// == Reclaimer Handle ==
/// Start/stop state for one cache's reclaimer.
///
/// Dropping the handle cancels the running loop.
#[derive(Debug)]
pub(crate) struct ReclaimerHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl ReclaimerHandle {
    pub fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
            task: None,
        }
    }

    /// A reclaimer is running while its task handle is held and unfinished.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Spawns the sweep loop on the current Tokio runtime.
    ///
    /// A fresh token is created on every start so a stopped reclaimer can be
    /// restarted.
    pub fn start<K, T, C>(&mut self, shared: &Arc<Shared<K, T, C>>) -> Result<()>
    where
        K: Eq + Hash + Clone + Send + Sync + 'static,
        T: Send + Sync + 'static,
        C: Clock,
    {
        let interval = shared.config.sweep_interval;
        if interval.is_zero() {
            debug!("Reclaimer disabled: sweep interval is zero");
            return Ok(());
        }
        if self.is_running() {
            debug!("Reclaimer already running");
            return Ok(());
        }

        let runtime = Handle::try_current().map_err(|_| CacheError::RuntimeUnavailable)?;

        self.cancel = CancellationToken::new();
        let task = runtime.spawn(reclaim_loop(
            Arc::clone(shared),
            interval,
            self.cancel.clone(),
        ));
        self.task = Some(task);

        info!("Reclaimer started with sweep interval of {:?}", interval);
        Ok(())
    }

    /// Cancels the loop and hands back its join handle, if one was running.
    pub fn stop(&mut self) -> Option<JoinHandle<()>> {
        let task = self.task.take()?;
        self.cancel.cancel();
        info!("Reclaimer stop requested");
        Some(task)
    }
}

impl Drop for ReclaimerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

// == Sweep Loop ==
async fn reclaim_loop<K, T, C>(
    shared: Arc<Shared<K, T, C>>,
    interval: Duration,
    cancel: CancellationToken,
) where
    K: Eq + Hash + Clone,
    C: Clock,
{
    let mut ticker = time::interval_at(time::Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Reclaimer stopped");
                return;
            }
            _ = ticker.tick() => {
                let removed = shared.sweep();
                if removed > 0 {
                    info!("Reclaimer sweep: removed {} expired entries", removed);
                } else {
                    debug!("Reclaimer sweep: no expired entries found");
                }
            }
        }
    }
}
