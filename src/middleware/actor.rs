use anyhow::anyhow;
use axum::{extract::FromRequestParts, http::request::Parts};
use menuward_core::AppError;
use menuward_models::UserId;

use crate::modules::assignments::Actor;
use crate::state::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The calling user, read from the `x-user-id` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub UserId);

impl AuthUser {
    pub fn user_id(&self) -> UserId {
        self.0
    }

    /// The caller as a synchronizer actor, carrying their active roles.
    pub async fn actor(&self, state: &AppState) -> Result<Actor, AppError> {
        Actor::load(state.store(), self.0).await
    }
}

fn parse_user_id(parts: &Parts) -> Result<UserId, AppError> {
    let value = parts
        .headers
        .get(USER_ID_HEADER)
        .ok_or_else(|| AppError::unauthorized(anyhow!("Missing {} header", USER_ID_HEADER)))?;

    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<i64>().ok())
        .map(UserId::new)
        .filter(UserId::is_set)
        .ok_or_else(|| AppError::unauthorized(anyhow!("Invalid {} header", USER_ID_HEADER)))
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parse_user_id(parts).map(AuthUser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/me/permissions");
        if let Some(value) = header {
            builder = builder.header(USER_ID_HEADER, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_parses_user_id() {
        assert_eq!(parse_user_id(&parts(Some("42"))).unwrap(), UserId::new(42));
    }

    #[test]
    fn test_missing_or_invalid_header_is_unauthorized() {
        for header in [None, Some("abc"), Some("0"), Some("-3")] {
            let err = parse_user_id(&parts(header)).unwrap_err();
            assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        }
    }
}
