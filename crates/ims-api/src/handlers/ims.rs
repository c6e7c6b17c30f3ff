//! Gateway envelope endpoint

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde_json::Value;

use crate::dispatch::dispatch;
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/IMS
///
/// Body is a JSON object with a `meth` field naming the operation and the
/// operation's fields alongside it.
pub async fn handle_envelope(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(envelope) = payload?;
    let body = dispatch(state.backend(), &envelope).await?;
    Ok(Json(body))
}
