//! Request authentication and the admin role gate.
//!
//! `require_auth` verifies the bearer token and stores the resulting
//! [`Claims`] in the request extensions. `require_admin` and the
//! [`AuthUser`] extractor only ever read from there; identity is never
//! carried in headers.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::{
    auth::{
        claims::{Claims, Role},
        jwt::JwtKeys,
    },
    error::ApiError,
};

pub async fn require_auth(
    State(keys): State<JwtKeys>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers()).ok_or_else(|| {
        warn!("missing or malformed Authorization header");
        ApiError::Unauthorized
    })?;

    let claims = keys.verify(token).map_err(|e| {
        warn!(error = %e, "invalid or expired token");
        ApiError::Unauthorized
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

/// Must sit inside `require_auth`; without claims the request is refused.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    match req.extensions().get::<Claims>() {
        Some(claims) if claims.role == Role::Admin => Ok(next.run(req).await),
        Some(claims) => {
            warn!(user_id = claims.sub, "admin route refused");
            Err(ApiError::Forbidden)
        }
        None => Err(ApiError::Forbidden),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();
    (!token.is_empty()).then_some(token)
}

/// Verified identity of the caller.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or(ApiError::Unauthorized)
    }
}
