use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, Credentials, PublicUser, RegisterResponse},
        middleware::AuthUser,
        password::{hash_password, verify_dummy, verify_password},
    },
    db::StoreError,
    error::ApiError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/auth/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let Json(payload) = payload?;
    let email = payload.normalized_email();
    if email.is_empty() || payload.password.is_empty() {
        warn!("register with missing email or password");
        return Err(ApiError::invalid_input("email and password are required"));
    }

    let hash = hash_password(&payload.password)?;

    let user = match state.store.create_user(&email, &hash).await {
        Ok(u) => u,
        Err(StoreError::UniqueViolation) => {
            warn!(email = %email, "email already registered");
            return Err(ApiError::DuplicateEmail);
        }
        Err(e) => return Err(e.into()),
    };

    // Preferences are created lazily on first read, so a failure here is not fatal.
    if let Err(e) = state.store.ensure_preferences(user.id).await {
        error!(error = %e, user_id = user.id, "create default preferences failed");
    }

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            ok: true,
            user_id: user.id,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(payload) = payload?;
    let email = payload.normalized_email();

    let Some(user) = state.store.find_user_by_email(&email).await? else {
        verify_dummy(&payload.password);
        warn!(email = %email, "login unknown email");
        return Err(ApiError::InvalidCredentials);
    };

    let ok = verify_password(&payload.password, &user.password_hash).unwrap_or_else(|e| {
        error!(error = %e, user_id = user.id, "stored password hash unreadable");
        false
    });
    if !ok {
        warn!(user_id = user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    let role = user.role();
    let token = state.jwt.issue(user.id, &user.email, role)?;

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        token,
        user: PublicUser {
            id: user.id,
            email: user.email,
            role,
        },
    }))
}

#[instrument(skip_all)]
pub async fn get_me(AuthUser(claims): AuthUser) -> Json<PublicUser> {
    Json(PublicUser {
        id: claims.sub,
        email: claims.email,
        role: claims.role,
    })
}
