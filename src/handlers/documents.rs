//! Plain key-value document save/load. No rate limiting, no validation
//! beyond presence checks.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use chrono::Utc;
use serde_json::json;

use crate::error::GatewayError;
use crate::metrics::DOCUMENTS_STORED;
use crate::models::{DocumentRecord, SaveDocumentRequest};
use crate::state::AppState;

pub async fn save_document_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SaveDocumentRequest>, JsonRejection>,
) -> Result<Json<serde_json::Value>, GatewayError> {
    let Json(request) = payload
        .map_err(|_| GatewayError::BadRequest("Missing 'id' or 'content' field".to_string()))?;

    state.documents.insert(
        request.id,
        DocumentRecord {
            content: request.content,
            timestamp: Utc::now(),
        },
    );
    DOCUMENTS_STORED.set(state.documents.len() as f64);

    Ok(Json(json!({"status": "success"})))
}

pub async fn load_document_handler(
    State(state): State<Arc<AppState>>,
    Path(doc_id): Path<String>,
) -> Result<Json<DocumentRecord>, GatewayError> {
    state
        .documents
        .get(&doc_id)
        .map(|record| Json(record.clone()))
        .ok_or_else(|| GatewayError::NotFound("Document not found".to_string()))
}
