use axum::{
    extract::{rejection::JsonRejection, State},
    routing::get,
    Json, Router,
};
use tracing::{debug, info, instrument};

use crate::{
    app::OkResponse,
    auth::middleware::AuthUser,
    db::Preferences,
    error::ApiError,
    state::AppState,
};

use super::dto::PreferencesBody;

pub fn router() -> Router<AppState> {
    Router::new().route("/preferences", get(get_preferences).post(update_preferences))
}

#[instrument(skip_all, fields(user_id = claims.sub))]
pub async fn get_preferences(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<PreferencesBody>, ApiError> {
    if let Some(prefs) = state.store.get_preferences(claims.sub).await? {
        return Ok(Json(prefs.into()));
    }

    debug!("no preferences yet; creating defaults");
    state.store.ensure_preferences(claims.sub).await?;
    Ok(Json(Preferences::default().into()))
}

#[instrument(skip_all, fields(user_id = claims.sub))]
pub async fn update_preferences(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    payload: Result<Json<PreferencesBody>, JsonRejection>,
) -> Result<Json<OkResponse>, ApiError> {
    let Json(payload) = payload?;
    let prefs = Preferences::from(payload);
    state.store.upsert_preferences(claims.sub, &prefs).await?;

    info!(
        watchlist = prefs.watchlist.len(),
        onboarding_completed = prefs.onboarding_completed,
        "preferences replaced"
    );
    Ok(Json(OkResponse { ok: true }))
}
