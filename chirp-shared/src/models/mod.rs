/// Database models for Chirp
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts, authentication, and account lifecycle
/// - `message`: Short text posts and the home feed query
/// - `follow`: Directed follow edges between users
/// - `like`: Like edges between users and messages
/// - `session`: Server-side sessions backing opaque bearer tokens
///
/// # Example
///
/// ```no_run
/// use chirp_shared::models::user::{User, CreateUser};
/// use chirp_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     username: "songbird".to_string(),
///     email: "songbird@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     image_url: None,
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod follow;
pub mod like;
pub mod message;
pub mod session;
pub mod user;
