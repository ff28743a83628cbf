//! Authentication extractors.
//!
//! Provides extractors for requiring a bearer token in route handlers.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use bazaar_core::UserId;

use crate::db;
use crate::error::ApiError;
use crate::models::User;
use crate::services::auth::TokenUse;
use crate::state::AppState;

/// Extractor that requires a valid access token and a non-blocked account.
///
/// Decodes the bearer token, loads the user row, and rejects blocked
/// accounts before the wrapped handler executes.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireUser(user): RequireUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let user_id = state
            .tokens()
            .verify(token, TokenUse::Access)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_owned()))?;

        let user = db::users::get_by_id(state.pool(), user_id)
            .await?
            .ok_or_else(|| {
                ApiError::Unauthorized(
                    "User belonging to this token no longer exists".to_owned(),
                )
            })?;

        if user.blocked {
            return Err(ApiError::Forbidden(
                "Your account is blocked. You cannot perform any actions.".to_owned(),
            ));
        }

        Ok(Self(user))
    }
}

/// Extractor that requires a valid refresh token.
///
/// Only the token is checked; the refresh endpoint looks up nothing else.
pub struct RequireRefresh(pub UserId);

impl FromRequestParts<AppState> for RequireRefresh {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;

        let user_id = state
            .tokens()
            .verify(token, TokenUse::Refresh)
            .map_err(|_| ApiError::Unauthorized("Invalid or expired refresh token".to_owned()))?;

        Ok(Self(user_id))
    }
}

/// Extract the bearer token from the Authorization header.
fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            ApiError::Unauthorized("You are not logged in, please provide a token".to_owned())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/products");
        if let Some(v) = value {
            builder = builder.header(header::AUTHORIZATION, v);
        }
        let (parts, ()) = builder.body(()).expect("valid request").into_parts();
        parts
    }

    #[test]
    fn test_bearer_token_extracted() {
        let parts = parts_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts).expect("token"), "abc.def.ghi");
    }

    #[test]
    fn test_missing_header_rejected() {
        let parts = parts_with_auth(None);
        assert!(bearer_token(&parts).is_err());
    }

    #[test]
    fn test_wrong_scheme_rejected() {
        let parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));
        assert!(bearer_token(&parts).is_err());
    }

    #[test]
    fn test_empty_token_rejected() {
        let parts = parts_with_auth(Some("Bearer "));
        assert!(bearer_token(&parts).is_err());
    }
}
