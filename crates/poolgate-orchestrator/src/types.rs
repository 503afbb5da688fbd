//! Identifiers for dynamically resolved workload kinds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A resolved `(group, version, resource)` triple for a scalable workload
/// kind, as advertised by orchestrator discovery.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupVersionResource {
    pub group: String,
    pub version: String,
    /// Plural resource name (e.g. "deployments").
    pub resource: String,
    /// The kind the triple was resolved from. Kept so request metadata can
    /// be rebuilt without a second discovery round-trip.
    pub kind: String,
}

impl GroupVersionResource {
    /// The `apiVersion` form: `"apps/v1"`, or bare `"v1"` for the core group.
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// The `resource.group` form used when addressing scale subresources.
    pub fn group_resource(&self) -> String {
        if self.group.is_empty() {
            self.resource.clone()
        } else {
            format!("{}.{}", self.resource, self.group)
        }
    }
}

impl fmt::Display for GroupVersionResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.api_version(), self.resource)
    }
}

/// A point-in-time read of a workload's scale subresource.
///
/// Only the desired count lives here. Ready counts come from the
/// workload's status and are never assumed consistent with this snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleSnapshot {
    pub name: String,
    pub desired_replicas: i32,
}
