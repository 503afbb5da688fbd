//! Datastore error types.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DatastoreError {
    #[error("no inference pool registered")]
    PoolNotFound,
}
