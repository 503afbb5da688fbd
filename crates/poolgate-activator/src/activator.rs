//! The scale-from-zero state machine.
//!
//! `Activator::inference_pool_ready` runs synchronously on the request
//! path: validate the pool's annotations, resolve the workload kind,
//! inspect the current scale, scale up if needed, wait (bounded) for
//! readiness, hold through the request-retention period, then release.
//! A true 0→1 transition also spawns the idleness watcher.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use poolgate_datastore::{Datastore, InferencePool};
use poolgate_orchestrator::{GroupVersionResource, OrchestratorClient};

use crate::config::{ActivationConfig, ActivatorDefaults};
use crate::watcher::IdleWatcher;

/// Cadence of the readiness poll.
const READINESS_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Drives 0↔1 scale transitions for the registered pool.
pub struct Activator {
    client: Arc<dyn OrchestratorClient>,
    datastore: Arc<Datastore>,
    defaults: ActivatorDefaults,
    /// Serializes watcher creation: no matter how many cold-start requests
    /// race, the compare-and-swap admits one watcher for the pool.
    watcher_alive: Arc<AtomicBool>,
    /// Process-lifetime shutdown signal handed to spawned watchers; never
    /// tied to any single request.
    shutdown: watch::Receiver<bool>,
}

impl Activator {
    pub fn new(
        client: Arc<dyn OrchestratorClient>,
        datastore: Arc<Datastore>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            client,
            datastore,
            defaults: ActivatorDefaults::default(),
            watcher_alive: Arc::new(AtomicBool::new(false)),
            shutdown,
        }
    }

    /// Override the built-in defaults (grace periods, retention hold).
    pub fn with_defaults(mut self, defaults: ActivatorDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Whether the idleness watcher for the pool is currently running.
    pub fn watcher_running(&self) -> bool {
        self.watcher_alive.load(Ordering::Acquire)
    }

    /// True only when at least one candidate replica has passed readiness
    /// (and, on a cold start, the post-ready hold has elapsed).
    ///
    /// Returns false in bounded time when readiness cannot be achieved:
    /// missing pool or annotations, unresolvable kind, rejected scale
    /// update, or an exhausted grace period. Never mutates cluster state
    /// for a misconfigured pool.
    pub async fn inference_pool_ready(&self) -> bool {
        let pool = match self.datastore.pool_get().await {
            Ok(pool) => pool,
            Err(err) => {
                warn!(error = %err, "cannot activate without a registered pool");
                return false;
            }
        };
        debug!(pool = %pool.id(), "inference pool found");

        let config = match ActivationConfig::from_pool(&pool, &self.defaults) {
            Ok(config) => config,
            Err(err) => {
                warn!(pool = %pool.id(), error = %err, "pool misconfigured, failing closed");
                return false;
            }
        };

        let gvr = match self
            .client
            .resolve_resource(&config.target.api_version, &config.target.kind)
            .await
        {
            Ok(gvr) => gvr,
            Err(err) => {
                error!(
                    pool = %pool.id(),
                    api_version = %config.target.api_version,
                    kind = %config.target.kind,
                    error = %err,
                    "failed to resolve target workload kind"
                );
                return false;
            }
        };

        // A failed scale read does not gate the request: the backend may
        // be reachable even when the control plane momentarily is not.
        let scale = match self
            .client
            .get_scale(&pool.namespace, &gvr, &config.target.name)
            .await
        {
            Ok(scale) => scale,
            Err(err) => {
                warn!(
                    pool = %pool.id(),
                    target = %config.target.name,
                    error = %err,
                    "scale read failed, assuming the backend is reachable"
                );
                return true;
            }
        };

        if scale.desired_replicas > 0
            && self
                .wait_for_ready(&pool.namespace, &gvr, &config, scale.desired_replicas)
                .await
        {
            debug!(
                target = %config.target.name,
                "at least one replica ready, skipping scale from zero"
            );
            return true;
        }

        self.scale_up_and_wait(&pool, &gvr, &config).await
    }

    /// Scale the target to one replica, wait for readiness, hold through
    /// the retention period, and spawn the idleness watcher.
    async fn scale_up_and_wait(
        &self,
        pool: &InferencePool,
        gvr: &GroupVersionResource,
        config: &ActivationConfig,
    ) -> bool {
        let desired = 1;
        if let Err(err) = self
            .client
            .update_scale(&pool.namespace, gvr, &config.target.name, desired)
            .await
        {
            error!(
                pool = %pool.id(),
                target = %config.target.name,
                error = %err,
                "failed to scale target up to one replica"
            );
            return false;
        }
        info!(
            target = %config.target.name,
            namespace = %pool.namespace,
            grace_secs = config.scale_from_zero_grace_period.as_secs(),
            "target scaled up to one replica"
        );

        if !self
            .wait_for_ready(&pool.namespace, gvr, config, desired)
            .await
        {
            return false;
        }

        info!(
            target = %config.target.name,
            hold_secs = self.defaults.request_retention_period.as_secs(),
            "candidate replicas ready, holding before releasing the request"
        );
        tokio::time::sleep(self.defaults.request_retention_period).await;

        self.spawn_watcher(pool, config);
        true
    }

    /// Poll `status.readyReplicas` at a fixed cadence until it reaches the
    /// desired count or the grace budget runs out.
    ///
    /// An absent status field consumes no budget: a workload that never
    /// publishes it waits until the caller abandons the request. A
    /// present-but-below value consumes one unit per poll; any value at or
    /// above the desired count satisfies readiness.
    async fn wait_for_ready(
        &self,
        namespace: &str,
        gvr: &GroupVersionResource,
        config: &ActivationConfig,
        desired: i32,
    ) -> bool {
        let budget = config.scale_from_zero_grace_period.as_secs();
        let mut consumed = 0u64;

        loop {
            match self
                .client
                .get_ready_replicas(namespace, gvr, &config.target.name)
                .await
            {
                Ok(Some(ready)) if ready >= i64::from(desired) => {
                    debug!(target = %config.target.name, ready, desired, "candidate replicas ready");
                    return true;
                }
                Ok(Some(ready)) => {
                    debug!(target = %config.target.name, ready, desired, "candidate replicas not ready");
                    consumed += 1;
                    if consumed > budget {
                        warn!(
                            target = %config.target.name,
                            grace_secs = budget,
                            "gave up waiting for candidate replicas"
                        );
                        return false;
                    }
                }
                Ok(None) => {
                    debug!(
                        target = %config.target.name,
                        "status.readyReplicas not published yet"
                    );
                }
                Err(err) => {
                    warn!(
                        target = %config.target.name,
                        error = %err,
                        "readiness read failed, polling again"
                    );
                }
            }

            tokio::time::sleep(READINESS_POLL_INTERVAL).await;
        }
    }

    /// Launch the idleness watcher for this pool unless one is already
    /// running; the compare-and-swap loses for every racer but one.
    fn spawn_watcher(&self, pool: &InferencePool, config: &ActivationConfig) {
        if self
            .watcher_alive
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(pool = %pool.id(), "idleness watcher already running");
            return;
        }

        let watcher = IdleWatcher::new(
            self.client.clone(),
            self.datastore.clone(),
            pool.namespace.clone(),
            pool.id(),
            config.clone(),
            self.watcher_alive.clone(),
        );
        tokio::spawn(watcher.run(self.shutdown.clone()));
        info!(pool = %pool.id(), "idleness watcher started");
    }
}
