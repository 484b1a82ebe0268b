/// Application state and router builder
///
/// This module defines the shared application state, the router, and the
/// session authentication middleware that resolves the actor once per
/// request.
///
/// # Example
///
/// ```no_run
/// use chirp_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = chirp_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{error::ApiError, middleware::headers::ResponseHeadersLayer};
use axum::{
    extract::Request,
    http::{header, HeaderMap, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, patch, post},
    Router,
};
use chirp_shared::{auth::middleware::AuthContext, models::session::Session};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /                             # home feed (actor) or anonymous payload
/// ├── GET  /health                       # health check (public)
/// ├── POST /signup                       # create user + session (anonymous only)
/// ├── POST /login                        # authenticate + session
/// ├── POST /logout                       # revoke session          [actor + csrf]
/// ├── /users                             # [actor]
/// │   ├── GET  /?q=                      # list/search users
/// │   ├── GET  /:id                      # profile + messages
/// │   ├── GET  /:id/following            # users :id follows
/// │   ├── GET  /:id/followers            # followers of :id
/// │   ├── GET  /:id/likes                # messages :id liked
/// │   ├── POST /follow/:id               # add follow edge         [csrf]
/// │   ├── POST /stop-following/:id       # remove follow edge
/// │   ├── PATCH /profile                 # edit profile (password re-entry)
/// │   └── POST /delete                   # delete account          [csrf]
/// └── /messages                          # [actor]
///     ├── POST /                         # create message
///     ├── GET  /:id                      # show message
///     ├── POST /:id/delete               # delete own message      [csrf]
///     └── POST /:id/like                 # toggle like             [csrf]
/// ```
///
/// The session auth middleware rejects requests without a resolvable actor;
/// anti-forgery tokens are checked inside the handlers marked `[csrf]`,
/// after the actor check.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Public routes: no actor required
    let public_routes = Router::new()
        .route("/", get(routes::feed::homepage))
        .route("/health", get(routes::health::health_check))
        .route("/signup", post(routes::auth::signup))
        .route("/login", post(routes::auth::login));

    // Session-authenticated routes
    let user_routes = Router::new()
        .route("/", get(routes::users::list_users))
        .route("/profile", patch(routes::users::update_profile))
        .route("/delete", post(routes::users::delete_account))
        .route("/follow/:id", post(routes::users::start_following))
        .route("/stop-following/:id", post(routes::users::stop_following))
        .route("/:id", get(routes::users::show_user))
        .route("/:id/following", get(routes::users::show_following))
        .route("/:id/followers", get(routes::users::show_followers))
        .route("/:id/likes", get(routes::users::show_likes));

    let message_routes = Router::new()
        .route("/", post(routes::messages::create_message))
        .route("/:id", get(routes::messages::show_message))
        .route("/:id/delete", post(routes::messages::delete_message))
        .route("/:id/like", post(routes::messages::toggle_like));

    let authed_routes = Router::new()
        .route("/logout", post(routes::auth::logout))
        .nest("/users", user_routes)
        .nest("/messages", message_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
            .allow_headers([
                header::AUTHORIZATION,
                header::CONTENT_TYPE,
                header::HeaderName::from_static("x-csrf-token"),
            ])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(authed_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(ResponseHeadersLayer::new())
        .with_state(state)
}

/// Resolves the actor from the `Authorization: Bearer <token>` header
///
/// Returns `Ok(None)` for anonymous requests: no header, a header in some
/// other scheme, or an unknown/expired token. An unresolvable actor is never
/// an error. Used directly by routes that serve both anonymous and
/// authenticated requests (homepage, signup); the auth middleware turns
/// `None` into 401 for routes that require an actor.
pub async fn resolve_actor(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<AuthContext>, ApiError> {
    let Some(auth_header) = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    else {
        return Ok(None);
    };

    let Some(token) = auth_header.strip_prefix("Bearer ") else {
        return Ok(None);
    };

    let Some(session) = Session::find_by_token(&state.db, token).await? else {
        return Ok(None);
    };

    Ok(Some(AuthContext::from_session(&session)))
}

/// Session authentication middleware layer
///
/// Resolves the actor and injects an `AuthContext` into request extensions.
/// Requests without a resolvable actor are rejected with 401.
async fn session_auth_layer(
    state: axum::extract::State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let actor = resolve_actor(&state, req.headers()).await?;

    let auth_context =
        actor.ok_or_else(|| ApiError::Unauthorized("Access unauthorized".to_string()))?;

    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}

/// Checks the anti-forgery token on a state-changing request
///
/// Actor presence has already been established by the middleware; this is
/// the second gate. A missing or mismatched `X-CSRF-Token` header rejects
/// the mutation as forbidden.
pub fn verify_csrf(auth: &AuthContext, headers: &HeaderMap) -> Result<(), ApiError> {
    let provided = headers
        .get("x-csrf-token")
        .and_then(|v| v.to_str().ok());

    if auth.csrf_matches(provided) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Missing or invalid anti-forgery token".to_string(),
        ))
    }
}
