//! Idleness watcher — scales the pool back to zero after inactivity.
//!
//! One watcher is spawned per 0→1 activation. It ticks on a fixed period,
//! compares the pool's last-request time against the scale-down delay,
//! and fires a single scale-to-zero once the pool has gone idle. A
//! successful scale-down ends the watcher; the next activation spawns a
//! fresh one. Failed ticks keep ticking.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use poolgate_datastore::Datastore;
use poolgate_orchestrator::{GroupVersionResource, OrchestratorClient};

use crate::config::ActivationConfig;

/// Fixed tick period; not configurable through annotations.
const TICK_PERIOD: Duration = Duration::from_secs(30);
/// Cadence of the post-scale-down drain poll.
const DRAIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Background task that watches the pool's last-request time and performs
/// the 1→0 transition.
///
/// The watcher acts on the pool identity and settings captured at spawn
/// time; replacing the pool descriptor afterwards does not redirect it.
/// Current scale is rediscovered through the orchestrator on every tick.
pub(crate) struct IdleWatcher {
    client: Arc<dyn OrchestratorClient>,
    datastore: Arc<Datastore>,
    namespace: String,
    pool_id: String,
    config: ActivationConfig,
    alive: Arc<AtomicBool>,
}

impl IdleWatcher {
    pub(crate) fn new(
        client: Arc<dyn OrchestratorClient>,
        datastore: Arc<Datastore>,
        namespace: String,
        pool_id: String,
        config: ActivationConfig,
        alive: Arc<AtomicBool>,
    ) -> Self {
        Self {
            client,
            datastore,
            namespace,
            pool_id,
            config,
            alive,
        }
    }

    /// Tick until the pool goes idle and a scale-to-zero completes, or
    /// until process shutdown. Clears the aliveness flag on the way out so
    /// the next 0→1 transition can spawn a fresh watcher.
    pub(crate) async fn run(self, mut shutdown: watch::Receiver<bool>) {
        debug!(
            pool = %self.pool_id,
            idle_secs = self.config.scale_down_delay.as_secs(),
            "idleness watcher running"
        );

        loop {
            tokio::select! {
                _ = tokio::time::sleep(TICK_PERIOD) => {
                    if self.tick().await {
                        break;
                    }
                }
                _ = shutdown.changed() => {
                    info!(pool = %self.pool_id, "shutdown signal received, stopping idleness watcher");
                    break;
                }
            }
        }

        self.alive.store(false, Ordering::Release);
    }

    /// One idleness check. Returns true when a scale-down completed and
    /// the watcher should terminate.
    async fn tick(&self) -> bool {
        let idle_for = match self.datastore.pool_request_time().await {
            Some(last) => last.elapsed(),
            // No request observed yet: infinitely old.
            None => Duration::MAX,
        };

        if idle_for <= self.config.scale_down_delay {
            debug!(
                pool = %self.pool_id,
                idle_secs = idle_for.as_secs(),
                "pool has not been idle long enough"
            );
            return false;
        }

        let gvr = match self
            .client
            .resolve_resource(&self.config.target.api_version, &self.config.target.kind)
            .await
        {
            Ok(gvr) => gvr,
            Err(err) => {
                warn!(pool = %self.pool_id, error = %err, "failed to resolve target workload kind");
                return false;
            }
        };

        if let Err(err) = self
            .client
            .get_scale(&self.namespace, &gvr, &self.config.target.name)
            .await
        {
            warn!(pool = %self.pool_id, error = %err, "failed to read scale subresource");
            return false;
        }

        if let Err(err) = self
            .client
            .update_scale(&self.namespace, &gvr, &self.config.target.name, 0)
            .await
        {
            warn!(pool = %self.pool_id, error = %err, "scale-down to zero was rejected");
            return false;
        }

        info!(pool = %self.pool_id, target = %self.config.target.name, "pool scaled down to zero replicas");
        self.wait_for_drain(&gvr).await;
        true
    }

    /// Wait (bounded by the scale-to-zero grace period) for replicas to
    /// drain after the scale-down. Purely observational: the outcome is
    /// logged, never acted on.
    async fn wait_for_drain(&self, gvr: &GroupVersionResource) {
        let budget = self.config.scale_to_zero_grace_period.as_secs();

        for _ in 0..budget {
            match self
                .client
                .get_ready_replicas(&self.namespace, gvr, &self.config.target.name)
                .await
            {
                Ok(Some(0)) | Ok(None) => {
                    debug!(pool = %self.pool_id, "replicas drained");
                    return;
                }
                Ok(Some(ready)) => {
                    debug!(pool = %self.pool_id, ready, "replicas still draining");
                }
                Err(err) => {
                    warn!(pool = %self.pool_id, error = %err, "drain check failed");
                }
            }
            tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
        }

        warn!(
            pool = %self.pool_id,
            grace_secs = budget,
            "replicas did not drain within the grace period"
        );
    }
}
