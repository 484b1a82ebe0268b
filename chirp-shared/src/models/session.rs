/// Session model and database operations
///
/// The Session Authority: maps opaque bearer tokens to user identities.
/// Sessions are rows, so logout is a server-side revocation (the token stops
/// resolving immediately) rather than waiting for a client to discard state.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE sessions (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     token VARCHAR(64) NOT NULL UNIQUE,
///     csrf_token VARCHAR(64) NOT NULL,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     expires_at TIMESTAMPTZ NOT NULL
/// );
/// ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::token::generate_token;

/// Session lifetime before the token stops resolving
const SESSION_TTL_DAYS: i64 = 30;

/// Server-side session backing an opaque bearer token
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    /// Session ID
    pub id: Uuid,

    /// Opaque bearer token presented by the client
    pub token: String,

    /// Anti-forgery token bound to this session
    pub csrf_token: String,

    /// The user this session authenticates
    pub user_id: Uuid,

    /// When the session was established
    pub created_at: DateTime<Utc>,

    /// When the token stops resolving
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Establishes a new session for a user
    ///
    /// Generates fresh bearer and anti-forgery tokens and persists them.
    pub async fn create(pool: &PgPool, user_id: Uuid) -> Result<Self, sqlx::Error> {
        let token = generate_token();
        let csrf_token = generate_token();
        let expires_at = Utc::now() + Duration::days(SESSION_TTL_DAYS);

        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (token, csrf_token, user_id, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, token, csrf_token, user_id, created_at, expires_at
            "#,
        )
        .bind(token)
        .bind(csrf_token)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(pool)
        .await?;

        Ok(session)
    }

    /// Resolves a bearer token to a session
    ///
    /// Unknown, revoked, and expired tokens all yield `Ok(None)`; an absent
    /// actor is an expected outcome, never an error.
    pub async fn find_by_token(pool: &PgPool, token: &str) -> Result<Option<Self>, sqlx::Error> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, token, csrf_token, user_id, created_at, expires_at
            FROM sessions
            WHERE token = $1 AND expires_at > NOW()
            "#,
        )
        .bind(token)
        .fetch_optional(pool)
        .await?;

        Ok(session)
    }

    /// Revokes a session by token
    ///
    /// Idempotent: revoking an unknown or already-revoked token is a no-op.
    /// Returns whether a session was actually removed.
    pub async fn revoke(pool: &PgPool, token: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Revokes a session by ID
    ///
    /// Same semantics as [`Session::revoke`], keyed by the session row
    /// instead of the token.
    pub async fn revoke_by_id(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Removes expired sessions
    ///
    /// Expired rows are already invisible to `find_by_token`; this just
    /// reclaims the space.
    pub async fn prune_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
