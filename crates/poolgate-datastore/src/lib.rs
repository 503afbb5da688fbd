//! poolgate-datastore — in-memory registry of the pool the activator serves.
//!
//! Holds the single pool descriptor and the timestamp of the last request
//! observed for it. Shared between the request path and the idleness
//! watcher; nothing survives a restart.

pub mod error;
pub mod store;
pub mod types;

pub use error::DatastoreError;
pub use store::Datastore;
pub use types::InferencePool;
