//! The verdict endpoint.
//!
//! `POST /v1/request` takes a parsed JSON request body, runs it through
//! the director, and answers with the resolved body (proceed), 400 (bad
//! request) or 503 (service unavailable). The gateway's egress filter is
//! the intended caller; it forwards the resolved body downstream.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Map, Value};
use tracing::debug;

use poolgate_director::{Director, DirectorError, RequestContext};

#[derive(Clone)]
pub struct AppState {
    director: Arc<Director>,
}

pub fn build_router(director: Arc<Director>) -> Router {
    Router::new()
        .route("/v1/request", post(handle_request))
        .route("/healthz", get(healthz))
        .with_state(AppState { director })
}

async fn healthz() -> &'static str {
    "ok"
}

/// Run one request body through the activation gate.
async fn handle_request(
    State(state): State<AppState>,
    Json(body): Json<Map<String, Value>>,
) -> impl IntoResponse {
    let mut ctx = RequestContext::new(body);

    match state.director.handle_request(&mut ctx).await {
        Ok(()) => {
            debug!(model = %ctx.target_model_name, "request released");
            (StatusCode::OK, Json(Value::Object(ctx.request_body))).into_response()
        }
        Err(err) => {
            let status = match err {
                DirectorError::BadRequest(_) => StatusCode::BAD_REQUEST,
                DirectorError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            };
            (
                status,
                Json(serde_json::json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}
