use axum::{
    extract::{rejection::JsonRejection, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    app::OkResponse,
    auth::middleware::AuthUser,
    db::PositionUpsert,
    error::ApiError,
    state::AppState,
};

use super::dto::{PositionView, UpsertPositionRequest};

pub fn router() -> Router<AppState> {
    Router::new().route("/portfolio", get(get_portfolio).post(upsert_position))
}

/// Holdings of one user, shared with the admin single-user report.
pub async fn positions_of(state: &AppState, user_id: i64) -> Result<Vec<PositionView>, ApiError> {
    let rows = state.store.list_positions(user_id).await?;
    Ok(rows.into_iter().map(PositionView::from).collect())
}

#[instrument(skip_all, fields(user_id = claims.sub))]
pub async fn get_portfolio(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<Json<Vec<PositionView>>, ApiError> {
    Ok(Json(positions_of(&state, claims.sub).await?))
}

#[instrument(skip_all, fields(user_id = claims.sub))]
pub async fn upsert_position(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    payload: Result<Json<UpsertPositionRequest>, JsonRejection>,
) -> Result<Json<OkResponse>, ApiError> {
    let Json(payload) = payload?;
    let symbol = payload.symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(ApiError::invalid_input("symbol required"));
    }

    state
        .store
        .upsert_position(&PositionUpsert {
            user_id: claims.sub,
            symbol: symbol.clone(),
            quantity: payload.quantity,
            avg_buy_price: payload.avg_buy_price,
        })
        .await?;

    info!(%symbol, quantity = payload.quantity, "position saved");
    Ok(Json(OkResponse { ok: true }))
}
