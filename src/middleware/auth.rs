use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{header, request::Parts},
};
use tower_cookies::Cookies;
use uuid::Uuid;

use crate::{error::AppError, services::auth_service, state::AppState};

pub const SESSION_COOKIE: &str = "session";

/// Identity of the caller, resolved from the session token on each request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub session_id: Uuid,
}

/// Token from `Authorization: Bearer ..`. A malformed header is an error,
/// not a fallback to the cookie.
fn bearer_token(parts: &Parts) -> Result<Option<String>, AppError> {
    let Some(auth_header) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };
    let auth_str = auth_header.to_str().map_err(|_| AppError::Unauthorized)?;
    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)?
        .trim();
    Ok(Some(token.to_string()))
}

/// Bearer token first, then the session cookie.
async fn session_token(parts: &mut Parts, state: &AppState) -> Result<Option<String>, AppError> {
    if let Some(token) = bearer_token(parts)? {
        return Ok(Some(token));
    }

    let cookies = Cookies::from_request_parts(parts, state)
        .await
        .map_err(|(_, msg)| AppError::Internal(anyhow::anyhow!(msg)))?;
    let token = cookies
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value_trimmed().to_string())
        .filter(|value| !value.is_empty());
    Ok(token)
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(parts, state).await?.ok_or(AppError::Unauthorized)?;
        auth_service::resolve_session(state, &token).await
    }
}

impl OptionalFromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Option<Self>, Self::Rejection> {
        let token = match session_token(parts, state).await {
            Ok(Some(token)) => token,
            Ok(None) | Err(AppError::Unauthorized) => return Ok(None),
            Err(err) => return Err(err),
        };
        match auth_service::resolve_session(state, &token).await {
            Ok(user) => Ok(Some(user)),
            Err(AppError::Unauthorized) => Ok(None),
            Err(err) => Err(err),
        }
    }
}
