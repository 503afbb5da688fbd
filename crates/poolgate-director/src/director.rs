//! Director — orchestrates the request lifecycle.

use std::sync::Arc;

use serde_json::Value;
use tokio::time::Instant;
use tracing::debug;

use poolgate_activator::Activator;
use poolgate_datastore::Datastore;

use crate::error::DirectorError;
use crate::request::RequestContext;

/// Request entry point: resolves the target model, gates on pool
/// readiness, and stamps the last-request time.
pub struct Director {
    datastore: Arc<Datastore>,
    activator: Arc<Activator>,
}

impl Director {
    pub fn new(datastore: Arc<Datastore>, activator: Arc<Activator>) -> Self {
        Self {
            datastore,
            activator,
        }
    }

    /// Handle one request.
    ///
    /// The context is mutated in place, so the caller still holds it for
    /// error handling whatever the verdict. The body's `model` field is
    /// rewritten to the resolved target *before* the readiness gate.
    pub async fn handle_request(&self, req: &mut RequestContext) -> Result<(), DirectorError> {
        let model = req
            .request_body
            .get("model")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                DirectorError::BadRequest("model not found in request body".to_string())
            })?;
        req.incoming_model_name = model.to_string();

        if req.target_model_name.is_empty() {
            req.target_model_name = req.incoming_model_name.clone();
        }
        req.request_body.insert(
            "model".to_string(),
            Value::String(req.target_model_name.clone()),
        );

        debug!(
            incoming = %req.incoming_model_name,
            target = %req.target_model_name,
            "incoming request"
        );

        if !self.activator.inference_pool_ready().await {
            return Err(DirectorError::ServiceUnavailable(
                "no active candidate replicas in the inference pool".to_string(),
            ));
        }

        // Stamped at release time, not arrival: activation may have dwelt
        // in the readiness wait.
        self.datastore.pool_set_request_time(Instant::now()).await;

        Ok(())
    }

    /// Response hook; a pass-through today, kept so instrumentation has a
    /// seam.
    pub async fn handle_response(&self, _req: &mut RequestContext) -> Result<(), DirectorError> {
        Ok(())
    }
}
