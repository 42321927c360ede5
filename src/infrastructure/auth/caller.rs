//! Identity of the party invoking a notifier operation.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::{header, request::Parts};

use crate::error::AppError;

use super::{AuthError, Claims, JwtValidator};

/// Authenticated user, or anonymous when no bearer token was presented.
#[derive(Debug, Clone, Default)]
pub struct Caller {
    claims: Option<Claims>,
}

impl Caller {
    pub fn anonymous() -> Self {
        Self { claims: None }
    }

    pub fn authenticated(claims: Claims) -> Self {
        Self {
            claims: Some(claims),
        }
    }

    /// Caller authenticated as `user_id`
    pub fn user(user_id: impl Into<String>) -> Self {
        Self::authenticated(Claims::for_user(user_id, 3600))
    }

    pub fn is_authenticated(&self) -> bool {
        self.claims.is_some()
    }

    pub fn claims(&self) -> Option<&Claims> {
        self.claims.as_ref()
    }

    /// The authenticated user's id
    pub fn user_id(&self) -> Result<&str, AuthError> {
        self.claims
            .as_ref()
            .map(Claims::user_id)
            .ok_or(AuthError::AuthenticationRequired)
    }

    /// `explicit` if given, otherwise the authenticated user's id
    pub fn resolve_user<'a>(&'a self, explicit: Option<&'a str>) -> Result<&'a str, AuthError> {
        match explicit {
            Some(user_id) => Ok(user_id),
            None => self.user_id(),
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

impl<S> FromRequestParts<S> for Caller
where
    Arc<JwtValidator>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Ok(Caller::anonymous());
        };

        let validator = Arc::<JwtValidator>::from_ref(state);
        let claims = validator.validate(token).map_err(|e| {
            tracing::warn!(error = %e, "Rejected bearer token");
            AppError::from(e)
        })?;

        Ok(Caller::authenticated(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_requires_explicit_user() {
        let caller = Caller::anonymous();

        assert!(!caller.is_authenticated());
        assert_eq!(caller.user_id(), Err(AuthError::AuthenticationRequired));
        assert_eq!(
            caller.resolve_user(None),
            Err(AuthError::AuthenticationRequired)
        );
        assert_eq!(caller.resolve_user(Some("user-9")), Ok("user-9"));
    }

    #[test]
    fn test_authenticated_defaults_to_own_id() {
        let caller = Caller::user("alice");

        assert_eq!(caller.user_id(), Ok("alice"));
        assert_eq!(caller.resolve_user(None), Ok("alice"));
        assert_eq!(caller.resolve_user(Some("bob")), Ok("bob"));
    }
}
