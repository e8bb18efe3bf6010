//! AI endpoint handlers.
//!
//! Every endpoint runs the same explicit pipeline in fixed order:
//! body validation → rate-limit admission → normalization → endpoint
//! override → streaming relay. Each stage either passes the request
//! through or fails with a classified `GatewayError`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, FromRequestParts, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::Response;
use serde_json::Value;

use crate::error::GatewayError;
use crate::metrics::{RATE_LIMITED, REQUEST_LATENCY, REQUEST_TOTAL};
use crate::models::NormalizedRequest;
use crate::normalize::normalize;
use crate::relay::stream_response;
use crate::state::AppState;

// System instruction injected by the proofread endpoint, replacing any
// client-supplied one
const PROOFREAD_INSTRUCTION: &str = "You are a professional proofreader. Your task is to:\n\
1. Fix spelling, grammar, and punctuation errors\n\
2. Maintain the original tone and style\n\
3. Only make necessary corrections\n\
4. Do not add explanations or comments";

// System instruction injected by the complete endpoint
const COMPLETE_INSTRUCTION: &str =
    "You are a helpful AI assistant. Complete the text naturally and coherently.";

// Completion keeps caller-supplied lower temperatures, lowers higher ones
const MAX_COMPLETION_TEMPERATURE: f32 = 0.8;

// Rate-limit accounting subject: x-api-key header if present, else the
// transport peer address.
#[derive(Debug, Clone)]
pub struct ClientId(pub String);

impl<S> FromRequestParts<S> for ClientId
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(key) = parts
            .headers
            .get("x-api-key")
            .and_then(|v| v.to_str().ok())
        {
            return Ok(ClientId(key.to_string()));
        }

        let id = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map_or_else(|| "unknown".to_string(), |info| info.0.ip().to_string());
        Ok(ClientId(id))
    }
}

// CORS pre-flight: empty success, no validation or admission
pub async fn preflight_handler() -> StatusCode {
    StatusCode::OK
}

pub async fn generate_handler(
    State(state): State<Arc<AppState>>,
    client: ClientId,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, GatewayError> {
    run_pipeline(state, client, payload, |_| {}).await
}

pub async fn proofread_handler(
    State(state): State<Arc<AppState>>,
    client: ClientId,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, GatewayError> {
    run_pipeline(state, client, payload, apply_proofread_override).await
}

pub async fn complete_handler(
    State(state): State<Arc<AppState>>,
    client: ClientId,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, GatewayError> {
    run_pipeline(state, client, payload, apply_complete_override).await
}

// validate → admit → normalize → override → stream
async fn run_pipeline(
    state: Arc<AppState>,
    client: ClientId,
    payload: Result<Json<Value>, JsonRejection>,
    apply_override: fn(&mut NormalizedRequest),
) -> Result<Response, GatewayError> {
    REQUEST_TOTAL.inc();
    let start = Instant::now();

    let Json(raw) = payload?;

    let admission = state.rate_limiter.admit(&client.0).inspect_err(|_| {
        RATE_LIMITED.inc();
    })?;

    let mut request = normalize(&raw)?;
    apply_override(&mut request);

    let response = stream_response(Arc::clone(&state.backend), request, admission).await;
    REQUEST_LATENCY.observe(start.elapsed().as_secs_f64());
    Ok(response)
}

fn apply_proofread_override(request: &mut NormalizedRequest) {
    request.system_message = Some(PROOFREAD_INSTRUCTION.to_string());
}

fn apply_complete_override(request: &mut NormalizedRequest) {
    request.system_message = Some(COMPLETE_INSTRUCTION.to_string());
    request.temperature = request.temperature.min(MAX_COMPLETION_TEMPERATURE);
}
