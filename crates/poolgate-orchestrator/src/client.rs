//! Orchestrator client — scale subresource access over dynamic kinds.
//!
//! `KubeScaleClient` resolves `(apiVersion, kind)` pairs through API
//! discovery, caches the result for the process lifetime, and addresses
//! the target workload as a `DynamicObject` so the activator stays
//! agnostic to the concrete controller kind behind a pool.

use std::collections::HashMap;

use async_trait::async_trait;
use kube::api::{Api, ApiResource, DynamicObject, GroupVersionKind, Patch, PatchParams};
use kube::Client;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::types::{GroupVersionResource, ScaleSnapshot};

/// Typed access to the orchestrator's scale machinery.
///
/// Implementations surface transport errors unchanged and never retry
/// internally; retry policy belongs to the caller.
#[async_trait]
pub trait OrchestratorClient: Send + Sync {
    /// Resolve an `(apiVersion, kind)` pair to its resource triple.
    ///
    /// Errors if the orchestrator does not advertise the kind.
    async fn resolve_resource(
        &self,
        api_version: &str,
        kind: &str,
    ) -> OrchestratorResult<GroupVersionResource>;

    /// Read the scale subresource of the named workload.
    async fn get_scale(
        &self,
        namespace: &str,
        gvr: &GroupVersionResource,
        name: &str,
    ) -> OrchestratorResult<ScaleSnapshot>;

    /// Write the desired replica count through the scale subresource.
    ///
    /// The update is not atomic with readiness: the returned snapshot
    /// reflects the accepted desired count, not running replicas.
    async fn update_scale(
        &self,
        namespace: &str,
        gvr: &GroupVersionResource,
        name: &str,
        replicas: i32,
    ) -> OrchestratorResult<ScaleSnapshot>;

    /// Read `status.readyReplicas` of the named workload.
    ///
    /// `Ok(None)` means the field is not published — a benign pre-ready
    /// state, distinct from a transport error.
    async fn get_ready_replicas(
        &self,
        namespace: &str,
        gvr: &GroupVersionResource,
        name: &str,
    ) -> OrchestratorResult<Option<i64>>;
}

/// kube-backed [`OrchestratorClient`].
pub struct KubeScaleClient {
    client: Client,
    /// Discovery results keyed by `(apiVersion, kind)`, cached for the
    /// process lifetime. A miss triggers one rediscovery.
    resolved: RwLock<HashMap<(String, String), GroupVersionResource>>,
}

impl KubeScaleClient {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            resolved: RwLock::new(HashMap::new()),
        }
    }

    /// Dynamic API handle for the workload kind behind `gvr`.
    fn dynamic_api(&self, namespace: &str, gvr: &GroupVersionResource) -> Api<DynamicObject> {
        let gvk = GroupVersionKind::gvk(&gvr.group, &gvr.version, &gvr.kind);
        let resource = ApiResource::from_gvk_with_plural(&gvk, &gvr.resource);
        Api::namespaced_with(self.client.clone(), namespace, &resource)
    }
}

/// Split an `apiVersion` string into `(group, version)`; core-group
/// versions come without a slash.
fn split_api_version(api_version: &str) -> (&str, &str) {
    match api_version.split_once('/') {
        Some((group, version)) => (group, version),
        None => ("", api_version),
    }
}

/// Read `spec.replicas` out of a scale subresource body.
fn desired_replicas(scale: &DynamicObject) -> i32 {
    scale
        .data
        .get("spec")
        .and_then(|spec| spec.get("replicas"))
        .and_then(Value::as_i64)
        .unwrap_or(0) as i32
}

#[async_trait]
impl OrchestratorClient for KubeScaleClient {
    async fn resolve_resource(
        &self,
        api_version: &str,
        kind: &str,
    ) -> OrchestratorResult<GroupVersionResource> {
        let key = (api_version.to_string(), kind.to_string());
        if let Some(found) = self.resolved.read().await.get(&key) {
            return Ok(found.clone());
        }

        let (group, version) = split_api_version(api_version);
        let gvk = GroupVersionKind::gvk(group, version, kind);
        let (resource, _capabilities) =
            match kube::discovery::pinned_kind(&self.client, &gvk).await {
                Ok(found) => found,
                Err(kube::Error::Discovery(err)) => {
                    debug!(api_version, kind, error = %err, "kind not advertised by the orchestrator");
                    return Err(OrchestratorError::UnknownKind {
                        api_version: api_version.to_string(),
                        kind: kind.to_string(),
                    });
                }
                Err(err) => return Err(err.into()),
            };

        let gvr = GroupVersionResource {
            group: resource.group.clone(),
            version: resource.version.clone(),
            resource: resource.plural.clone(),
            kind: resource.kind.clone(),
        };
        debug!(api_version, kind, %gvr, "resolved workload kind");

        self.resolved.write().await.insert(key, gvr.clone());
        Ok(gvr)
    }

    async fn get_scale(
        &self,
        namespace: &str,
        gvr: &GroupVersionResource,
        name: &str,
    ) -> OrchestratorResult<ScaleSnapshot> {
        let api = self.dynamic_api(namespace, gvr);
        let scale = api.get_subresource("scale", name).await?;
        Ok(ScaleSnapshot {
            name: name.to_string(),
            desired_replicas: desired_replicas(&scale),
        })
    }

    async fn update_scale(
        &self,
        namespace: &str,
        gvr: &GroupVersionResource,
        name: &str,
        replicas: i32,
    ) -> OrchestratorResult<ScaleSnapshot> {
        let api = self.dynamic_api(namespace, gvr);
        let patch = json!({ "spec": { "replicas": replicas } });
        let scale = api
            .patch_subresource("scale", name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;
        debug!(namespace, name, replicas, "scale subresource updated");
        Ok(ScaleSnapshot {
            name: name.to_string(),
            desired_replicas: desired_replicas(&scale),
        })
    }

    async fn get_ready_replicas(
        &self,
        namespace: &str,
        gvr: &GroupVersionResource,
        name: &str,
    ) -> OrchestratorResult<Option<i64>> {
        let api = self.dynamic_api(namespace, gvr);
        let workload = api.get(name).await?;
        Ok(workload
            .data
            .get("status")
            .and_then(|status| status.get("readyReplicas"))
            .and_then(Value::as_i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_api_version_with_group() {
        assert_eq!(split_api_version("apps/v1"), ("apps", "v1"));
        assert_eq!(split_api_version("serving.llm-d.ai/v1alpha1"), ("serving.llm-d.ai", "v1alpha1"));
    }

    #[test]
    fn split_api_version_core_group() {
        assert_eq!(split_api_version("v1"), ("", "v1"));
    }

    #[test]
    fn desired_replicas_reads_spec() {
        let mut scale = DynamicObject::new(
            "web",
            &ApiResource::from_gvk_with_plural(
                &GroupVersionKind::gvk("apps", "v1", "Deployment"),
                "deployments",
            ),
        );
        scale.data = json!({ "spec": { "replicas": 3 } });
        assert_eq!(desired_replicas(&scale), 3);

        scale.data = json!({ "spec": {} });
        assert_eq!(desired_replicas(&scale), 0);

        scale.data = json!({});
        assert_eq!(desired_replicas(&scale), 0);
    }
}
