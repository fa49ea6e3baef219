// SPDX-FileCopyrightText: 2026 Helpline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::error;

use helpline_core::HelplineError;

use crate::server::GatewayState;

/// Body of POST /api/chat.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Query of GET /api/quality.
#[derive(Debug, Deserialize)]
pub struct QualityQuery {
    #[serde(default = "default_days")]
    pub days: i64,
}

fn default_days() -> i64 {
    7
}

/// GET /health
pub async fn get_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// POST /api/chat -- blocking turn.
pub async fn post_chat(
    State(state): State<GatewayState>,
    Json(body): Json<ChatRequest>,
) -> Response {
    if body.message.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "message must not be empty");
    }

    match state
        .orchestrator
        .process_turn(body.session_id, &body.message, body.user_id)
        .await
    {
        Ok(result) => Json(result).into_response(),
        Err(e) => {
            error!(error = %e, "turn failed");
            turn_error_response(&e)
        }
    }
}

/// GET /api/history/{session_id} -- the memory window, not the audit trail.
pub async fn get_history(
    State(state): State<GatewayState>,
    Path(session_id): Path<String>,
) -> Response {
    let history = state.orchestrator.history(&session_id).await;
    Json(history).into_response()
}

/// POST /api/conversations/{session_id}/end
pub async fn post_end_conversation(
    State(state): State<GatewayState>,
    Path(session_id): Path<String>,
) -> Response {
    match state.orchestrator.end_conversation(&session_id).await {
        Ok(()) => Json(serde_json::json!({ "status": "closed" })).into_response(),
        Err(e) => {
            error!(error = %e, "failed to end conversation");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "failed to end conversation")
        }
    }
}

/// GET /api/quality?days=7
pub async fn get_quality(
    State(state): State<GatewayState>,
    Query(query): Query<QualityQuery>,
) -> Response {
    match state.quality.overall_metrics(query.days).await {
        Ok(report) => Json(report).into_response(),
        Err(e) => {
            error!(error = %e, "quality metrics failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "metrics unavailable")
        }
    }
}

/// Map a turn failure onto a status code: generation failure is an
/// upstream problem (502); anything else is internal.
fn turn_error_response(e: &HelplineError) -> Response {
    match e {
        HelplineError::Provider { .. } => {
            error_response(StatusCode::BAD_GATEWAY, "reply generation failed")
        }
        HelplineError::Internal(message) => error_response(StatusCode::BAD_REQUEST, message),
        _ => error_response(StatusCode::INTERNAL_SERVER_ERROR, "turn failed"),
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}
