/// Request authentication context
///
/// The API server resolves the actor once per request (from the session
/// bearer token) and injects an [`AuthContext`] into request extensions.
/// Handlers receive the actor explicitly through this context instead of
/// consulting any global request state.
///
/// Anti-forgery: state-changing endpoints compare the `X-CSRF-Token` header
/// against the csrf token bound to the session. Actor presence is checked
/// first (by the middleware), token validity second (by the handler).

use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::models::session::Session;

/// Authenticated actor for the current request
///
/// Cloned into request extensions by the session auth middleware.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The acting user's ID
    pub user_id: Uuid,

    /// The session backing this request
    pub session_id: Uuid,

    /// Anti-forgery token bound to the session
    csrf_token: String,
}

impl AuthContext {
    /// Builds an auth context from a resolved session
    pub fn from_session(session: &Session) -> Self {
        Self {
            user_id: session.user_id,
            session_id: session.id,
            csrf_token: session.csrf_token.clone(),
        }
    }

    /// Checks a provided anti-forgery token against the session's token
    ///
    /// Absent or mismatched tokens fail the check; the caller rejects the
    /// mutation as forbidden. The comparison is constant-time so the check
    /// leaks nothing about how much of a guessed token matched.
    pub fn csrf_matches(&self, provided: Option<&str>) -> bool {
        match provided {
            Some(token) => token
                .as_bytes()
                .ct_eq(self.csrf_token.as_bytes())
                .into(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn test_context() -> AuthContext {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            token: "a".repeat(64),
            csrf_token: "b".repeat(64),
            user_id: Uuid::new_v4(),
            created_at: now,
            expires_at: now + Duration::days(30),
        };
        AuthContext::from_session(&session)
    }

    #[test]
    fn test_csrf_matches() {
        let ctx = test_context();
        assert!(ctx.csrf_matches(Some(&"b".repeat(64))));
    }

    #[test]
    fn test_csrf_mismatch() {
        let ctx = test_context();
        assert!(!ctx.csrf_matches(Some("nope")));
    }

    #[test]
    fn test_csrf_equal_length_mismatch() {
        let ctx = test_context();
        assert!(!ctx.csrf_matches(Some(&"c".repeat(64))));
    }

    #[test]
    fn test_csrf_absent() {
        let ctx = test_context();
        assert!(!ctx.csrf_matches(None));
    }

    #[test]
    fn test_from_session_copies_identity() {
        let now = Utc::now();
        let session = Session {
            id: Uuid::new_v4(),
            token: "t".repeat(64),
            csrf_token: "c".repeat(64),
            user_id: Uuid::new_v4(),
            created_at: now,
            expires_at: now + Duration::days(30),
        };
        let ctx = AuthContext::from_session(&session);
        assert_eq!(ctx.user_id, session.user_id);
        assert_eq!(ctx.session_id, session.id);
    }
}
