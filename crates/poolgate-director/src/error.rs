//! The director's error surface.

use thiserror::Error;

/// Errors surfaced to the caller of the director.
///
/// These two kinds are the complete contract: orchestrator failures never
/// escape past the activation gate, they only influence the verdict.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DirectorError {
    /// The request body lacks a usable `model` field.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Readiness could not be achieved within the grace period, or the
    /// pool is missing or misconfigured.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}
