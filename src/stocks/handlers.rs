use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::{debug, instrument};

use crate::{
    auth::middleware::AuthUser,
    db::HISTORY_LIMIT,
    error::ApiError,
    state::AppState,
};

use super::dto::{PricePointView, QuoteView};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stocks", get(list_latest))
        .route("/stocks/:symbol", get(history))
}

#[instrument(skip(state, _user))]
pub async fn list_latest(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<QuoteView>>, ApiError> {
    let quotes = state.store.latest_quotes().await?;
    debug!(count = quotes.len(), "latest quotes");
    Ok(Json(quotes.into_iter().map(QuoteView::from).collect()))
}

#[instrument(skip(state, _user))]
pub async fn history(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(symbol): Path<String>,
) -> Result<Json<Vec<PricePointView>>, ApiError> {
    let points = state.store.price_history(&symbol, HISTORY_LIMIT).await?;
    Ok(Json(points.into_iter().map(PricePointView::from).collect()))
}
