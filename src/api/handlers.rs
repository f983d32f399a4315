//! HTTP request handlers

use super::types::{CreateRecordRequest, ErrorResponse};
use super::AppState;
use crate::db::{ConversationRecord, DbError};
use crate::line::types::{MessageContent, WebhookBody, WebhookEvent};
use crate::line::SIGNATURE_HEADER;
use crate::reply::render;
use crate::runtime::BotReply;
use crate::state_machine::messages::GENERIC_APOLOGY;
use crate::state_machine::InboundEvent;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        // LINE webhook
        .route("/callback", post(callback))
        .route("/callback/", post(callback))
        // Conversation history
        .route("/api/conversation", post(create_record))
        .route("/api/conversation/:user_id", get(get_history))
        .with_state(state)
}

async fn root() -> &'static str {
    "Hello, clinic bot"
}

async fn health() -> &'static str {
    "ok"
}

// ============================================================
// Webhook
// ============================================================

async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    if let Err(e) = state.verifier.verify(&body, signature) {
        tracing::warn!(error = %e, "Rejected webhook delivery");
        return Err(AppError::BadRequest("Invalid signature".to_string()));
    }

    let payload: WebhookBody = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "Malformed webhook body");
        AppError::BadRequest(format!("Malformed body: {e}"))
    })?;

    tracing::debug!(events = payload.events.len(), "Webhook received");

    let events: Vec<_> = payload.events.into_iter().filter_map(to_inbound).collect();
    if !events.is_empty() {
        // Detached from the request: replies still go out if the platform stops waiting
        tokio::spawn(process_delivery(state, events));
    }

    Ok("OK")
}

/// Handle a delivery's events in order, so one user's events reach their
/// session in sequence
async fn process_delivery(state: AppState, events: Vec<(String, InboundEvent)>) {
    for (reply_token, event) in events {
        process_event(&state, &reply_token, event).await;
    }
}

/// Message events we can act on, paired with their reply token
fn to_inbound(event: WebhookEvent) -> Option<(String, InboundEvent)> {
    let WebhookEvent::Message(message) = event else {
        return None;
    };
    let Some(user_id) = message.source.user_id else {
        tracing::debug!("Skipping event without user id");
        return None;
    };
    let Some(reply_token) = message.reply_token else {
        tracing::debug!(user_id = %user_id, "Skipping event without reply token");
        return None;
    };

    let event = match message.message {
        MessageContent::Text { text } => InboundEvent::text(user_id, text),
        MessageContent::Location {
            latitude,
            longitude,
        } => InboundEvent::location(user_id, latitude, longitude),
        MessageContent::Unsupported => {
            tracing::debug!(user_id = %user_id, "Skipping unsupported message type");
            return None;
        }
    };
    Some((reply_token, event))
}

/// Run one event in its own task so a panic costs only that reply
async fn process_event(state: &AppState, reply_token: &str, event: InboundEvent) {
    let user_id = event.user_id().to_string();
    let runtime = Arc::clone(&state.runtime);

    let reply = match tokio::spawn(async move { runtime.handle(event).await }).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!(user_id = %user_id, error = %e, "Event handler crashed");
            BotReply::plain(GENERIC_APOLOGY)
        }
    };

    if let Err(e) = state.replies.reply(reply_token, render(&reply)).await {
        tracing::error!(user_id = %user_id, error = %e, "Failed to send reply");
    }
}

// ============================================================
// Conversation History
// ============================================================

async fn create_record(
    State(state): State<AppState>,
    Json(req): Json<CreateRecordRequest>,
) -> Result<Json<ConversationRecord>, AppError> {
    let record = state
        .db
        .add_record(&req.user_id, &req.user_message, &req.bot_response)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(Json(record))
}

async fn get_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<ConversationRecord>>, AppError> {
    let history = state.db.get_history(&user_id).map_err(|e| match e {
        DbError::HistoryNotFound(_) => AppError::NotFound(e.to_string()),
        DbError::Sqlite(_) => AppError::Internal(e.to_string()),
    })?;
    Ok(Json(history))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
