/// Like relation and database operations
///
/// The other half of the Social Graph: a unique `(user, message)` edge
/// marking a message as liked. The only mutation is a toggle — add the edge
/// if absent, remove it if present — executed in one transaction so a
/// concurrent toggle on the same pair cannot leave a half-applied state.
///
/// A user may not like their own message; that is a policy rule enforced
/// here, not by the schema.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::message::Message;

/// Error type for like mutations
#[derive(Debug, thiserror::Error)]
pub enum LikeError {
    /// The message does not exist
    #[error("Message not found")]
    MessageNotFound,

    /// A user may not like their own message
    #[error("A user may not like their own message")]
    SelfLikeForbidden,

    /// Database error
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Like edges between users and messages
pub struct Like;

impl Like {
    /// Toggles the like edge between `user_id` and `message_id`
    ///
    /// Fails with [`LikeError::SelfLikeForbidden`] when the actor owns the
    /// message, regardless of prior state. Otherwise flips edge membership
    /// and returns the new state (`true` = now liked).
    pub async fn toggle(pool: &PgPool, user_id: Uuid, message_id: Uuid) -> Result<bool, LikeError> {
        let mut tx = pool.begin().await?;

        let owner: Option<(Uuid,)> =
            sqlx::query_as("SELECT user_id FROM messages WHERE id = $1")
                .bind(message_id)
                .fetch_optional(&mut *tx)
                .await?;

        let (owner_id,) = owner.ok_or(LikeError::MessageNotFound)?;
        if owner_id == user_id {
            return Err(LikeError::SelfLikeForbidden);
        }

        let removed = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND message_id = $2")
            .bind(user_id)
            .bind(message_id)
            .execute(&mut *tx)
            .await?;

        let liked = if removed.rows_affected() > 0 {
            false
        } else {
            sqlx::query("INSERT INTO likes (user_id, message_id) VALUES ($1, $2)")
                .bind(user_id)
                .bind(message_id)
                .execute(&mut *tx)
                .await?;
            true
        };

        tx.commit().await?;

        Ok(liked)
    }

    /// Whether `user_id` has liked `message_id`
    pub async fn exists(pool: &PgPool, user_id: Uuid, message_id: Uuid) -> Result<bool, sqlx::Error> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM likes WHERE user_id = $1 AND message_id = $2)",
        )
        .bind(user_id)
        .bind(message_id)
        .fetch_one(pool)
        .await?;

        Ok(exists.0)
    }

    /// Messages liked by `user_id`, newest like first
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Message>, sqlx::Error> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT m.id, m.text, m.user_id, m.created_at
            FROM messages m
            JOIN likes l ON l.message_id = m.id
            WHERE l.user_id = $1
            ORDER BY l.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(messages)
    }

    /// Number of messages `user_id` has liked
    pub async fn count_for_user(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM likes WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Number of likes on `message_id`
    pub async fn count_for_message(pool: &PgPool, message_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM likes WHERE message_id = $1")
            .bind(message_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
