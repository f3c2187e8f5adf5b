//! Bearer-token access gate for protected routes.
use crate::auth::Claims;
use crate::metrics::TOKEN_REJECTED;
use crate::{error::AppError, AppState};
use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use metrics::counter;
use std::sync::Arc;
use tracing::debug;
use userbase_common::AccountId;

const BEARER_PREFIX: &str = "Bearer ";

/// Identity of the caller, placed in request extensions by [`require_auth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub account_id: AccountId,
    pub email: String,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            account_id: claims.sub,
            email: claims.email,
        }
    }
}

/// Reject the request with 401 unless it carries a valid bearer token.
/// The wrapped handler runs only on success.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = match bearer_token(request.headers()) {
        Ok(token) => token,
        Err(e) => {
            counter!(TOKEN_REJECTED).increment(1);
            return Err(e);
        },
    };

    let claims = state.tokens.validate(token).map_err(|e| {
        counter!(TOKEN_REJECTED).increment(1);
        debug!(error = %e, "token rejected");
        AppError::from(e)
    })?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser::from(claims));

    Ok(next.run(request).await)
}

/// Pull the token out of `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| AppError::Unauthenticated("missing or malformed token".to_string()))?;

    let token = value
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Unauthenticated("missing or malformed token".to_string()))?;

    Ok(token)
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthenticated("request is not authenticated".to_string()))
    }
}
