use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

// Unified error taxonomy - every failure in the gateway ends up here.
// Classified variants carry a status; anything else is a 500.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Rate limit exceeded. Try again after {reset_at}")]
    RateLimited { reset_at: i64 },

    #[error("{0}")]
    NotFound(String),

    // Upstream completion call failed
    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Upstream(_) | GatewayError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

// Structured error body: {"error": "...", "status": 400}
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    status: u16,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        // log once, at the point of final handling
        tracing::warn!(status = status.as_u16(), "{message}");

        let body = ErrorBody {
            error: message,
            status: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

// Body/JSON extraction failures surface as bad requests, not axum's
// default rejection bodies.
impl From<axum::extract::rejection::JsonRejection> for GatewayError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        use axum::extract::rejection::JsonRejection;
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                GatewayError::BadRequest("Content-Type must be application/json".to_string())
            }
            other => GatewayError::BadRequest(format!("Invalid request format: {other}")),
        }
    }
}
