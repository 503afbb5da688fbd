//! poolgate-orchestrator — typed access to the orchestrator scale machinery.
//!
//! Resolves annotation-supplied `(apiVersion, kind)` pairs to concrete
//! resources through API discovery (cached for the process lifetime), and
//! reads/writes the scale subresource plus `status.readyReplicas` of
//! arbitrary workload kinds.
//!
//! No operation retries internally and no error is swallowed: transport
//! and authorization failures surface unchanged, and the caller decides
//! the retry policy.

pub mod client;
pub mod error;
pub mod types;

pub use client::{KubeScaleClient, OrchestratorClient};
pub use error::{OrchestratorError, OrchestratorResult};
pub use types::{GroupVersionResource, ScaleSnapshot};
