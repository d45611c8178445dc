//! Message ingestion endpoint.
//!
//! A single synchronous write path: decode → validate → insert → confirm.
//! The decode step is explicit (the handler takes the `Json` extraction
//! result rather than the payload itself) so that a missing body, malformed
//! JSON, and well-formed JSON failing validation each produce their own 400
//! message.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tracing::info;
use utoipa::OpenApi;

use crate::db::{MessageStore, NewMessage};
use crate::error::ServerError;
use crate::schemas::message::{SaveMessageRequest, SaveMessageResponse};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(save_message),
    components(schemas(SaveMessageRequest, SaveMessageResponse))
)]
pub struct MessageApi;

/// Register message routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/message", post(save_message))
}

/// Accept a chat message and persist it.
///
/// Returns the engine-assigned id on success.  Blank `groupOrUserName` or
/// `messageContent` is rejected with 400; storage failures surface as a
/// generic 500 with the cause logged server-side only.
#[utoipa::path(
    post,
    path = "/api/message",
    tag = "messages",
    request_body = SaveMessageRequest,
    responses(
        (status = 200, description = "Message persisted", body = SaveMessageResponse),
        (status = 400, description = "Missing body, malformed JSON, or blank required field"),
        (status = 500, description = "Storage failure"),
    )
)]
pub async fn save_message(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Option<SaveMessageRequest>>, JsonRejection>,
) -> Result<Json<SaveMessageResponse>, ServerError> {
    let req = decode_submission(payload)?;

    if req.group_or_user_name.is_empty() || req.message_content.is_empty() {
        return Err(ServerError::BadRequest(
            "group/user name and message content must not be empty".to_owned(),
        ));
    }

    info!(
        source = %req.group_or_user_name,
        content = %req.message_content,
        received_at = %req.received_date_time,
        "message received"
    );

    let id = state
        .store
        .insert(NewMessage {
            group_or_user_name: req.group_or_user_name,
            message_content: req.message_content,
            received_at: req.received_date_time,
        })
        .await?;

    info!(message_id = id, "message persisted");

    Ok(Json(SaveMessageResponse {
        success: true,
        message_id: id,
        message: "message saved".to_owned(),
    }))
}

/// Unwrap the explicit decode result.
///
/// A JSON literal `null` body deserializes to `None` and is treated the same
/// as an absent body.
fn decode_submission(
    payload: Result<Json<Option<SaveMessageRequest>>, JsonRejection>,
) -> Result<SaveMessageRequest, ServerError> {
    match payload {
        Ok(Json(Some(req))) => Ok(req),
        Ok(Json(None)) => Err(ServerError::BadRequest(
            "request body must not be empty".to_owned(),
        )),
        Err(rejection) => {
            let message = match &rejection {
                JsonRejection::JsonSyntaxError(_) => "request body is not valid JSON".to_owned(),
                JsonRejection::MissingJsonContentType(_) => {
                    "expected an application/json request body".to_owned()
                }
                _ => format!("invalid request body: {}", rejection.body_text()),
            };
            Err(ServerError::BadRequest(message))
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
