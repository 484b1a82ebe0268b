/// Message model and database operations
///
/// The Message Store: short text posts with exclusive ownership. Messages
/// are immutable after creation; the only mutations are insert and delete.
/// Also home of the feed query (the Feed Assembler's single read).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE messages (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     text VARCHAR(140) NOT NULL,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Maximum message length (characters)
pub const MAX_MESSAGE_LEN: usize = 140;

/// How many messages the home feed returns at most
pub const HOME_FEED_LIMIT: i64 = 100;

/// A short text post owned by exactly one user
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    /// Message ID
    pub id: Uuid,

    /// Message text (1..=140 characters)
    pub text: String,

    /// Owning user
    pub user_id: Uuid,

    /// Server-assigned creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Creates a message owned by `user_id`
    ///
    /// Text bounds (non-empty, at most [`MAX_MESSAGE_LEN`]) are validated at
    /// the API boundary; the schema's CHECK constraint backs the non-empty
    /// invariant.
    pub async fn create(pool: &PgPool, user_id: Uuid, text: &str) -> Result<Self, sqlx::Error> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (text, user_id)
            VALUES ($1, $2)
            RETURNING id, text, user_id, created_at
            "#,
        )
        .bind(text)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(message)
    }

    /// Finds a message by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let message = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, text, user_id, created_at
            FROM messages
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(message)
    }

    /// Deletes a message by ID
    ///
    /// Ownership is enforced by the caller (the Authorization Gate); this is
    /// the raw store operation. Returns whether a row was removed.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists a user's messages, newest first
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, text, user_id, created_at
            FROM messages
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(messages)
    }

    /// Assembles the home feed for a user
    ///
    /// Messages owned by the user or by anyone the user follows, ordered by
    /// timestamp descending, truncated to the [`HOME_FEED_LIMIT`] most
    /// recent. The owner set is computed inside the query, so the feed never
    /// includes a message from outside it.
    pub async fn home_feed(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, text, user_id, created_at
            FROM messages
            WHERE user_id = $1
               OR user_id IN (SELECT followed_id FROM follows WHERE follower_id = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(HOME_FEED_LIMIT)
        .fetch_all(pool)
        .await?;

        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits() {
        assert_eq!(MAX_MESSAGE_LEN, 140);
        assert_eq!(HOME_FEED_LIMIT, 100);
    }

    // Feed membership, ordering, and bounding are covered by the API
    // integration tests against a live database.
}
