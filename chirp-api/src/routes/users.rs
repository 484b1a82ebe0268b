/// User endpoints
///
/// Listing/search, profiles with follow counts, follow/unfollow mutations,
/// profile editing (with password re-entry), account deletion, and liked
/// message listings. All of these require an actor; ownership checks apply
/// to the owner-only operations.
///
/// # Endpoints
///
/// - `GET /users?q=` - List users, optionally filtered by username substring
/// - `GET /users/:id` - Show profile with messages and counts
/// - `GET /users/:id/following` - Users this user follows
/// - `GET /users/:id/followers` - This user's followers
/// - `GET /users/:id/likes` - Messages this user has liked
/// - `POST /users/follow/:id` - Follow a user (anti-forgery token)
/// - `POST /users/stop-following/:id` - Unfollow a user
/// - `PATCH /users/profile` - Edit own profile (password re-entry)
/// - `POST /users/delete` - Delete own account (anti-forgery token)

use crate::{
    app::{verify_csrf, AppState},
    error::{ApiError, ApiResult},
    routes::messages::MessagePayload,
};
use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Extension, Json,
};
use chirp_shared::{
    auth::middleware::AuthContext,
    models::{
        follow::Follow,
        like::Like,
        message::Message,
        user::{UpdateProfile, User},
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Public view of a user (never includes the password hash)
#[derive(Debug, Serialize)]
pub struct UserPayload {
    /// User ID
    pub id: Uuid,

    /// Username
    pub username: String,

    /// Email address
    pub email: String,

    /// Profile image URL
    pub image_url: String,

    /// Header image URL
    pub header_image_url: String,

    /// Bio
    pub bio: String,

    /// Location
    pub location: String,

    /// Account creation time
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserPayload {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            image_url: user.image_url,
            header_image_url: user.header_image_url,
            bio: user.bio,
            location: user.location,
            created_at: user.created_at,
        }
    }
}

/// Query string for user listing
#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    /// Optional username substring filter (case-insensitive)
    pub q: Option<String>,
}

/// User list response
#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    /// Matching users
    pub users: Vec<UserPayload>,
}

/// Profile response: the user plus their messages and graph counts
#[derive(Debug, Serialize)]
pub struct ShowUserResponse {
    /// The user
    pub user: UserPayload,

    /// The user's messages, newest first
    pub messages: Vec<MessagePayload>,

    /// Number of users this user follows
    pub following_count: i64,

    /// Number of followers
    pub follower_count: i64,

    /// Number of messages this user has liked
    pub like_count: i64,

    /// Whether the requesting actor follows this user
    pub followed_by_you: bool,
}

/// Follow mutation response
#[derive(Debug, Serialize)]
pub struct FollowResponse {
    /// Whether the actor now follows the target
    pub following: bool,
}

/// Profile edit request
///
/// The current password must be re-entered; the username is not editable.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    /// Current password, re-entered
    pub password: String,

    /// New email address
    #[validate(email(message = "Invalid email format"))]
    #[validate(length(max = 50, message = "Email must be at most 50 characters"))]
    pub email: String,

    /// New profile image URL (default applied when blank)
    #[validate(length(max = 512, message = "Image URL must be at most 512 characters"))]
    pub image_url: Option<String>,

    /// New header image URL (default applied when blank)
    #[validate(length(max = 512, message = "Header image URL must be at most 512 characters"))]
    pub header_image_url: Option<String>,

    /// New bio
    pub bio: String,

    /// New location
    #[validate(length(max = 30, message = "Location must be at most 30 characters"))]
    pub location: String,
}

/// Account deletion response
#[derive(Debug, Serialize)]
pub struct DeleteAccountResponse {
    /// Whether the account was deleted
    pub deleted: bool,
}

/// List users, optionally filtered by a username substring
pub async fn list_users(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Query(query): Query<ListUsersQuery>,
) -> ApiResult<Json<ListUsersResponse>> {
    let users = User::list(&state.db, query.q.as_deref()).await?;

    Ok(Json(ListUsersResponse {
        users: users.into_iter().map(UserPayload::from).collect(),
    }))
}

/// Show a user profile with their messages and follow counts
///
/// # Errors
///
/// - `404 Not Found`: No user with that ID
pub async fn show_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ShowUserResponse>> {
    let user = User::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let messages = Message::list_by_user(&state.db, id).await?;
    let following_count = Follow::following_count(&state.db, id).await?;
    let follower_count = Follow::follower_count(&state.db, id).await?;
    let like_count = Like::count_for_user(&state.db, id).await?;
    let followed_by_you = Follow::is_following(&state.db, auth.user_id, id).await?;

    Ok(Json(ShowUserResponse {
        user: UserPayload::from(user),
        messages: messages.into_iter().map(MessagePayload::from).collect(),
        following_count,
        follower_count,
        like_count,
        followed_by_you,
    }))
}

/// List the users this user follows
pub async fn show_following(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ListUsersResponse>> {
    ensure_user_exists(&state, id).await?;

    let users = Follow::following(&state.db, id).await?;

    Ok(Json(ListUsersResponse {
        users: users.into_iter().map(UserPayload::from).collect(),
    }))
}

/// List this user's followers
pub async fn show_followers(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ListUsersResponse>> {
    ensure_user_exists(&state, id).await?;

    let users = Follow::followers(&state.db, id).await?;

    Ok(Json(ListUsersResponse {
        users: users.into_iter().map(UserPayload::from).collect(),
    }))
}

/// List the messages this user has liked
pub async fn show_likes(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<crate::routes::messages::MessageListResponse>> {
    ensure_user_exists(&state, id).await?;

    let messages = Like::list_for_user(&state.db, id).await?;

    Ok(Json(crate::routes::messages::MessageListResponse {
        messages: messages.into_iter().map(MessagePayload::from).collect(),
    }))
}

/// Follow a user
///
/// Requires the anti-forgery token. Following someone you already follow is
/// a no-op; following yourself is rejected.
///
/// # Errors
///
/// - `403 Forbidden`: Bad anti-forgery token, or self-follow
/// - `404 Not Found`: Target user does not exist
pub async fn start_following(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FollowResponse>> {
    verify_csrf(&auth, &headers)?;
    ensure_user_exists(&state, id).await?;

    Follow::create(&state.db, auth.user_id, id).await?;

    Ok(Json(FollowResponse { following: true }))
}

/// Stop following a user
///
/// Unfollowing someone you don't follow is a no-op.
///
/// # Errors
///
/// - `404 Not Found`: Target user does not exist
pub async fn stop_following(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<FollowResponse>> {
    ensure_user_exists(&state, id).await?;

    Follow::delete(&state.db, auth.user_id, id).await?;

    Ok(Json(FollowResponse { following: false }))
}

/// Edit the actor's own profile
///
/// The current password must be re-entered and is verified against the
/// actor's stored hash before any field changes.
///
/// # Errors
///
/// - `403 Forbidden`: Wrong password
/// - `409 Conflict`: New email already in use
/// - `422 Unprocessable Entity`: Validation failed
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<UserPayload>> {
    req.validate().map_err(ApiError::from_validation)?;

    let actor = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let verified = User::authenticate(&state.db, &actor.username, &req.password).await?;
    if verified.is_none() {
        return Err(ApiError::Forbidden("Wrong password".to_string()));
    }

    let updated = User::update_profile(
        &state.db,
        auth.user_id,
        UpdateProfile {
            email: req.email,
            image_url: req.image_url,
            header_image_url: req.header_image_url,
            bio: req.bio,
            location: req.location,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(UserPayload::from(updated)))
}

/// Delete the actor's own account
///
/// Requires the anti-forgery token. Removes the account, every message it
/// owns, and every follow/like edge referencing it, in one transaction.
/// The current session disappears with the account.
///
/// # Errors
///
/// - `403 Forbidden`: Bad anti-forgery token
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    headers: HeaderMap,
) -> ApiResult<Json<DeleteAccountResponse>> {
    verify_csrf(&auth, &headers)?;

    let deleted = User::delete_account(&state.db, auth.user_id).await?;

    tracing::info!(user_id = %auth.user_id, "Account deleted");

    Ok(Json(DeleteAccountResponse { deleted }))
}

/// 404 when the path's user ID doesn't resolve
async fn ensure_user_exists(state: &AppState, id: Uuid) -> ApiResult<()> {
    User::find_by_id(&state.db, id)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}
