//! Orchestrator error types.

use thiserror::Error;

/// Errors surfaced by orchestrator operations.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("orchestrator does not advertise kind {kind} in {api_version}")]
    UnknownKind { api_version: String, kind: String },

    #[error(transparent)]
    Kube(#[from] kube::Error),
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;
