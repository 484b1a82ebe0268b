/// Homepage feed
///
/// The only endpoint that renders differently for anonymous and
/// authenticated requests, so it resolves the actor itself instead of
/// sitting behind the auth layer.
///
/// # Endpoint
///
/// - `GET /`

use crate::{
    app::{resolve_actor, AppState},
    error::ApiResult,
    routes::messages::MessagePayload,
};
use axum::{extract::State, http::HeaderMap, Json};
use chirp_shared::models::message::Message;
use serde::Serialize;

/// Homepage response
#[derive(Debug, Serialize)]
pub struct HomepageResponse {
    /// Whether the request was anonymous
    pub anonymous: bool,

    /// The feed: the actor's own messages plus those of everyone they
    /// follow, newest first, at most 100 entries. Empty for anonymous
    /// requests.
    pub messages: Vec<MessagePayload>,
}

/// Homepage handler
///
/// Authenticated requests get their home feed; anonymous requests get an
/// empty landing payload rather than an error.
pub async fn homepage(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<HomepageResponse>> {
    let actor = resolve_actor(&state, &headers).await?;

    let Some(auth) = actor else {
        return Ok(Json(HomepageResponse {
            anonymous: true,
            messages: Vec::new(),
        }));
    };

    let messages = Message::home_feed(&state.db, auth.user_id).await?;

    Ok(Json(HomepageResponse {
        anonymous: false,
        messages: messages.into_iter().map(MessagePayload::from).collect(),
    }))
}
