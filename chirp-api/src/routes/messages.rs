/// Message endpoints
///
/// Creation, display, owner-only deletion, and like toggling. Messages are
/// capped at 140 characters and never editable once posted.
///
/// # Endpoints
///
/// - `POST /messages` - Post a new message
/// - `GET /messages/:id` - Show a single message
/// - `POST /messages/:id/delete` - Delete own message (anti-forgery token)
/// - `POST /messages/:id/like` - Toggle a like (anti-forgery token)

use crate::{
    app::{verify_csrf, AppState},
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Extension, Json,
};
use chirp_shared::{
    auth::middleware::AuthContext,
    models::{like::Like, message::Message},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Public view of a message
#[derive(Debug, Serialize)]
pub struct MessagePayload {
    /// Message ID
    pub id: Uuid,

    /// Message text
    pub text: String,

    /// Author's user ID
    pub user_id: Uuid,

    /// When the message was posted
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Message> for MessagePayload {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            text: message.text,
            user_id: message.user_id,
            created_at: message.created_at,
        }
    }
}

/// Message list response
#[derive(Debug, Serialize)]
pub struct MessageListResponse {
    /// Messages, newest first
    pub messages: Vec<MessagePayload>,
}

/// Message creation request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMessageRequest {
    /// Message text, 1 to 140 characters
    #[validate(length(min = 1, max = 140, message = "Message must be 1-140 characters"))]
    pub text: String,
}

/// Single message response, with its like count
#[derive(Debug, Serialize)]
pub struct ShowMessageResponse {
    /// The message
    pub message: MessagePayload,

    /// How many users have liked it
    pub like_count: i64,

    /// Whether the requesting actor has liked it
    pub liked_by_you: bool,
}

/// Like toggle response
#[derive(Debug, Serialize)]
pub struct LikeResponse {
    /// Whether the actor likes the message after the toggle
    pub liked: bool,
}

/// Message deletion response
#[derive(Debug, Serialize)]
pub struct DeleteMessageResponse {
    /// Whether the message was deleted
    pub deleted: bool,
}

/// Post a new message
///
/// The message is owned by the actor; ownership is taken from the session,
/// never from the request body.
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Empty or over-length text
pub async fn create_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateMessageRequest>,
) -> ApiResult<Json<MessagePayload>> {
    req.validate().map_err(ApiError::from_validation)?;

    let message = Message::create(&state.db, auth.user_id, &req.text).await?;

    tracing::debug!(message_id = %message.id, user_id = %auth.user_id, "Message posted");

    Ok(Json(MessagePayload::from(message)))
}

/// Show a single message with its like count
///
/// # Errors
///
/// - `404 Not Found`: No message with that ID
pub async fn show_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ShowMessageResponse>> {
    let message = Message::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))?;

    let like_count = Like::count_for_message(&state.db, id).await?;
    let liked_by_you = Like::exists(&state.db, auth.user_id, id).await?;

    Ok(Json(ShowMessageResponse {
        message: MessagePayload::from(message),
        like_count,
        liked_by_you,
    }))
}

/// Delete a message
///
/// Requires the anti-forgery token, and only the message's owner may delete
/// it. Any likes on the message go with it.
///
/// # Errors
///
/// - `403 Forbidden`: Bad anti-forgery token, or actor does not own the message
/// - `404 Not Found`: No message with that ID
pub async fn delete_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteMessageResponse>> {
    verify_csrf(&auth, &headers)?;

    let message = Message::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Message not found".to_string()))?;

    if message.user_id != auth.user_id {
        return Err(ApiError::Forbidden(
            "Access unauthorized".to_string(),
        ));
    }

    let deleted = Message::delete(&state.db, id).await?;

    Ok(Json(DeleteMessageResponse { deleted }))
}

/// Toggle a like on a message
///
/// Requires the anti-forgery token. Liking your own message is rejected.
/// Toggling twice restores the original state.
///
/// # Errors
///
/// - `403 Forbidden`: Bad anti-forgery token, or the actor owns the message
/// - `404 Not Found`: No message with that ID
pub async fn toggle_like(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<LikeResponse>> {
    verify_csrf(&auth, &headers)?;

    let liked = Like::toggle(&state.db, auth.user_id, id).await?;

    Ok(Json(LikeResponse { liked }))
}
