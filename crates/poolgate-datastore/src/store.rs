//! The process-wide pool registry.

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::error::DatastoreError;
use crate::types::InferencePool;

#[derive(Default)]
struct Inner {
    pool: Option<InferencePool>,
    last_request: Option<Instant>,
}

/// State shared between the request path and the idleness watcher.
///
/// An explicit value passed by reference to the director and each spawned
/// watcher — never a module-level singleton. At most one pool is
/// registered at a time; callers that need multi-pool behavior instantiate
/// multiple cores.
#[derive(Default)]
pub struct Datastore {
    inner: RwLock<Inner>,
}

impl Datastore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registered pool, if any.
    pub async fn pool_get(&self) -> Result<InferencePool, DatastoreError> {
        self.inner
            .read()
            .await
            .pool
            .clone()
            .ok_or(DatastoreError::PoolNotFound)
    }

    /// Register (or replace) the pool this activator serves.
    ///
    /// Replacing the descriptor does not disturb a watcher already running
    /// against the previous identity.
    pub async fn pool_set(&self, pool: InferencePool) {
        debug!(pool = %pool.id(), "pool registered");
        self.inner.write().await.pool = Some(pool);
    }

    /// When the pool last saw a successfully activated request.
    ///
    /// `None` means no request has been observed yet and reads as
    /// "infinitely old" to the idleness watcher.
    pub async fn pool_request_time(&self) -> Option<Instant> {
        self.inner.read().await.last_request
    }

    /// Stamp the last-request time.
    ///
    /// Out-of-order stamps are accepted; the watcher interprets whatever
    /// it reads as the last observation.
    pub async fn pool_set_request_time(&self, t: Instant) {
        self.inner.write().await.last_request = Some(t);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pool_get_before_set_is_not_found() {
        let store = Datastore::new();
        assert_eq!(store.pool_get().await, Err(DatastoreError::PoolNotFound));
    }

    #[tokio::test]
    async fn pool_set_then_get() {
        let store = Datastore::new();
        store.pool_set(InferencePool::new("default", "llama")).await;

        let pool = store.pool_get().await.unwrap();
        assert_eq!(pool.id(), "default/llama");
    }

    #[tokio::test]
    async fn pool_set_replaces_previous() {
        let store = Datastore::new();
        store.pool_set(InferencePool::new("default", "llama")).await;
        store.pool_set(InferencePool::new("default", "mistral")).await;

        assert_eq!(store.pool_get().await.unwrap().name, "mistral");
    }

    #[tokio::test]
    async fn request_time_starts_unset() {
        let store = Datastore::new();
        assert!(store.pool_request_time().await.is_none());
    }

    #[tokio::test]
    async fn request_time_round_trips() {
        let store = Datastore::new();
        let now = Instant::now();
        store.pool_set_request_time(now).await;
        assert_eq!(store.pool_request_time().await, Some(now));
    }

    #[tokio::test]
    async fn concurrent_stamps_keep_latest_write() {
        let store = std::sync::Arc::new(Datastore::new());
        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.pool_set_request_time(Instant::now()).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert!(store.pool_request_time().await.is_some());
    }
}
