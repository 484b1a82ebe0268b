/// Authentication endpoints
///
/// This module provides the session lifecycle endpoints:
/// - Signup (creates the user and logs them in)
/// - Login
/// - Logout (server-side session revocation)
///
/// # Endpoints
///
/// - `POST /signup` - Create user + session (anonymous only)
/// - `POST /login` - Authenticate and establish a session
/// - `POST /logout` - Revoke the current session (requires anti-forgery token)

use crate::{
    app::{resolve_actor, verify_csrf, AppState},
    error::{ApiError, ApiResult},
    routes::users::UserPayload,
};
use axum::{extract::State, http::HeaderMap, Extension, Json};
use chirp_shared::{
    auth::{middleware::AuthContext, password},
    models::{
        session::Session,
        user::{CreateUser, User},
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Username
    #[validate(length(min = 1, max = 30, message = "Username must be 1-30 characters"))]
    pub username: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    #[validate(length(max = 50, message = "Email must be at most 50 characters"))]
    pub email: String,

    /// Password
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    /// Optional profile image URL
    #[validate(length(max = 512, message = "Image URL must be at most 512 characters"))]
    pub image_url: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    /// Password
    pub password: String,
}

/// Response for signup and login: the profile plus session credentials
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    /// The authenticated user
    pub user: UserPayload,

    /// Opaque session bearer token
    pub token: String,

    /// Anti-forgery token to send on state-changing requests
    pub csrf_token: String,
}

/// Logout response
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    /// Whether a session was actually revoked
    pub logged_out: bool,
}

/// Signup endpoint
///
/// Creates a new user and establishes a session for it (auto-login).
/// Only anonymous requests may sign up: a request carrying a valid session
/// is rejected.
///
/// Username/email uniqueness is settled by the database constraints, so a
/// signup racing another on the same value loses cleanly with a 409 and no
/// partial row.
///
/// # Endpoint
///
/// ```text
/// POST /signup
/// Content-Type: application/json
///
/// {
///   "username": "songbird",
///   "email": "songbird@example.com",
///   "password": "warble-warble",
///   "image_url": null
/// }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: Request already carries a valid session
/// - `409 Conflict`: Username or email already exists
/// - `422 Unprocessable Entity`: Validation failed
pub async fn signup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SignupRequest>,
) -> ApiResult<Json<SessionResponse>> {
    if resolve_actor(&state, &headers).await?.is_some() {
        return Err(ApiError::Forbidden(
            "Already logged in; log out before signing up".to_string(),
        ));
    }

    req.validate().map_err(ApiError::from_validation)?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
            image_url: req.image_url,
        },
    )
    .await?;

    let session = Session::create(&state.db, user.id).await?;

    tracing::info!(user_id = %user.id, "New user signed up");

    Ok(Json(SessionResponse {
        user: UserPayload::from(user),
        token: session.token,
        csrf_token: session.csrf_token,
    }))
}

/// Login endpoint
///
/// Authenticates a user by username and password and establishes a session.
/// Wrong username and wrong password are indistinguishable in the response.
///
/// # Endpoint
///
/// ```text
/// POST /login
/// Content-Type: application/json
///
/// {
///   "username": "songbird",
///   "password": "warble-warble"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials
/// - `422 Unprocessable Entity`: Validation failed
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<SessionResponse>> {
    req.validate().map_err(ApiError::from_validation)?;

    let user = User::authenticate(&state.db, &req.username, &req.password)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let session = Session::create(&state.db, user.id).await?;

    Ok(Json(SessionResponse {
        user: UserPayload::from(user),
        token: session.token,
        csrf_token: session.csrf_token,
    }))
}

/// Logout endpoint
///
/// Revokes the current session server-side; the bearer token stops
/// resolving immediately. Idempotent: revoking an already-gone session
/// still succeeds.
///
/// # Endpoint
///
/// ```text
/// POST /logout
/// Authorization: Bearer <token>
/// X-CSRF-Token: <csrf_token>
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: No actor
/// - `403 Forbidden`: Missing or invalid anti-forgery token
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    headers: HeaderMap,
) -> ApiResult<Json<LogoutResponse>> {
    verify_csrf(&auth, &headers)?;

    let logged_out = Session::revoke_by_id(&state.db, auth.session_id).await?;

    Ok(Json(LogoutResponse { logged_out }))
}
