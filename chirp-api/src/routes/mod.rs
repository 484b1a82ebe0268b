/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Signup, login, logout
/// - `users`: User listing/search, profiles, follows, account lifecycle
/// - `messages`: Message creation, display, deletion, likes
/// - `feed`: Homepage feed

pub mod auth;
pub mod feed;
pub mod health;
pub mod messages;
pub mod users;
