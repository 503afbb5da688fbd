//! poolgate-activator — the 0↔1 control loop for an inference pool.
//!
//! The activator sits on the request path: when a request arrives for a
//! pool whose workload is scaled to zero, it scales the workload up
//! through the orchestrator, waits (bounded) for readiness, holds briefly
//! to absorb readiness-reporting skew, then releases the request. Each
//! successful 0→1 transition spawns a single idleness watcher that scales
//! the workload back to zero once no request has been seen for the
//! configured delay.
//!
//! Scaling decisions are idempotent: concurrent cold-start requests may
//! all write `desiredReplicas = 1`, wait on the same readiness, and return
//! together, but at most one watcher ever runs.

pub mod activator;
pub mod config;
mod watcher;

pub use activator::Activator;
pub use config::{ActivationConfig, ActivatorDefaults, MissingAnnotation, TargetRef};
