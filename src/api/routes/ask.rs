//! The query endpoint.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::server::AppState;
use crate::handler::{AnswerOutcome, EMPTY_QUERY_PROMPT};

/// Request body for `POST /api`.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub query: String,
}

/// POST /api — answer a free-text travel question.
///
/// A missing `query` field or an unparseable body is treated the same as
/// an empty query: 400 with the fixed prompt, never a raw error.
pub async fn ask(
    State(state): State<Arc<AppState>>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let query = match body {
        Ok(Json(req)) => req.query,
        Err(_) => String::new(),
    };

    match state.handler.handle(&query).await {
        AnswerOutcome::Reply(text) => (StatusCode::OK, Json(json!({ "reply": text }))),
        AnswerOutcome::EmptyQuery => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "reply": EMPTY_QUERY_PROMPT })),
        ),
        AnswerOutcome::Unresolved { reply, error } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "reply": reply, "error": error })),
        ),
    }
}
