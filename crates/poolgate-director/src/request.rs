//! Per-request context threaded through the director.

use serde_json::{Map, Value};

/// Mutable request state the director reads and annotates.
///
/// Created by the surrounding filter once the request body is parsed. The
/// director consumes the body's `model` field and writes back the resolved
/// target so the downstream backend sees it — even on requests that end up
/// rejected, so error logs carry the resolved name.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// Parsed JSON body of the request.
    pub request_body: Map<String, Value>,
    /// Model name found in the incoming body.
    pub incoming_model_name: String,
    /// Model the request is served by; defaults to the incoming name.
    pub target_model_name: String,
}

impl RequestContext {
    /// Build a context around an already-parsed body.
    pub fn new(request_body: Map<String, Value>) -> Self {
        Self {
            request_body,
            ..Self::default()
        }
    }
}
