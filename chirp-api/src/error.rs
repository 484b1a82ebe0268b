/// Error handling for the API server
///
/// A unified error type that maps to HTTP responses. All handlers return
/// `Result<T, ApiError>` which converts to the right status code and a JSON
/// error body.
///
/// Taxonomy (per design):
/// - `Unauthorized` (401): no actor resolved for the request
/// - `Forbidden` (403): wrong actor, bad anti-forgery token, self-follow,
///   self-like
/// - `NotFound` (404): missing resource
/// - `Conflict` (409): duplicate username/email, caught at the storage
///   constraint and re-presented with the offending field
/// - `ValidationError` (422): field-level input errors
/// - `InternalError` (500): everything else; details are logged, never
///   surfaced

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Unauthorized (401) - no actor
    Unauthorized(String),

    /// Forbidden (403) - wrong actor, bad anti-forgery token, policy rejection
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - duplicate username or email
    Conflict {
        /// Field whose uniqueness constraint was violated
        field: String,
        /// Human-readable message
        message: String,
    },

    /// Unprocessable entity (422) - validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "unauthorized", "conflict")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional field-level details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    /// Converts `validator` derive failures into field-level details
    pub fn from_validation(errors: validator::ValidationErrors) -> Self {
        let details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();

        ApiError::ValidationError(details)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict { field, message } => {
                write!(f, "Conflict on {}: {}", field, message)
            }
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict { field, message } => (
                StatusCode::CONFLICT,
                "conflict",
                message.clone(),
                Some(vec![ValidationErrorDetail { field, message }]),
            ),
            ApiError::ValidationError(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
///
/// Unique constraint violations are identified by constraint name so the
/// race between an application-level pre-check and the insert resolves at
/// the storage layer.
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                if let Some(constraint) = db_err.constraint() {
                    if constraint == "users_username_key" {
                        return ApiError::Conflict {
                            field: "username".to_string(),
                            message: "Username already taken".to_string(),
                        };
                    }
                    if constraint == "users_email_key" {
                        return ApiError::Conflict {
                            field: "email".to_string(),
                            message: "Email already exists".to_string(),
                        };
                    }
                    return ApiError::InternalError(format!(
                        "Constraint violation: {}",
                        constraint
                    ));
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert password errors to API errors
impl From<chirp_shared::auth::password::PasswordError> for ApiError {
    fn from(err: chirp_shared::auth::password::PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert authentication lookup errors to API errors
impl From<chirp_shared::models::user::AuthenticateError> for ApiError {
    fn from(err: chirp_shared::models::user::AuthenticateError) -> Self {
        use chirp_shared::models::user::AuthenticateError;
        match err {
            AuthenticateError::Database(e) => e.into(),
            AuthenticateError::Password(e) => e.into(),
        }
    }
}

/// Convert follow errors to API errors
impl From<chirp_shared::models::follow::FollowError> for ApiError {
    fn from(err: chirp_shared::models::follow::FollowError) -> Self {
        use chirp_shared::models::follow::FollowError;
        match err {
            FollowError::SelfFollowForbidden => {
                ApiError::Forbidden("You cannot follow yourself".to_string())
            }
            FollowError::Database(e) => e.into(),
        }
    }
}

/// Convert like errors to API errors
impl From<chirp_shared::models::like::LikeError> for ApiError {
    fn from(err: chirp_shared::models::like::LikeError) -> Self {
        use chirp_shared::models::like::LikeError;
        match err {
            LikeError::MessageNotFound => ApiError::NotFound("Message not found".to_string()),
            LikeError::SelfLikeForbidden => {
                ApiError::Forbidden("You cannot like your own message".to_string())
            }
            LikeError::Database(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::Unauthorized("Access unauthorized".to_string());
        assert_eq!(err.to_string(), "Unauthorized: Access unauthorized");

        let err = ApiError::NotFound("Message not found".to_string());
        assert_eq!(err.to_string(), "Not found: Message not found");
    }

    #[test]
    fn test_conflict_display() {
        let err = ApiError::Conflict {
            field: "username".to_string(),
            message: "Username already taken".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Conflict on username: Username already taken"
        );
    }

    #[test]
    fn test_validation_error_display() {
        let errors = vec![
            ValidationErrorDetail {
                field: "email".to_string(),
                message: "Invalid email format".to_string(),
            },
            ValidationErrorDetail {
                field: "password".to_string(),
                message: "Password too short".to_string(),
            },
        ];

        let err = ApiError::ValidationError(errors);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
    }

    #[test]
    fn test_row_not_found_maps_to_404() {
        let err: ApiError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_self_like_maps_to_forbidden() {
        let err: ApiError = chirp_shared::models::like::LikeError::SelfLikeForbidden.into();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn test_self_follow_maps_to_forbidden() {
        let err: ApiError = chirp_shared::models::follow::FollowError::SelfFollowForbidden.into();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }
}
