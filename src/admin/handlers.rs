use axum::{
    extract::{rejection::PathRejection, Path, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    db::HoldingRow,
    error::ApiError,
    portfolio::{dto::PositionView, handlers::positions_of},
    state::AppState,
};

use super::dto::{AdminUserView, UserPortfolio};

/// Admin reports; the caller wraps these in the auth and admin middleware.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/portfolios", get(list_portfolios))
        .route("/admin/users/:id/portfolio", get(user_portfolio))
}

#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<AdminUserView>>, ApiError> {
    let users = state.store.list_users().await?;
    info!(count = users.len(), "admin listed users");
    Ok(Json(users.into_iter().map(AdminUserView::from).collect()))
}

#[instrument(skip(state))]
pub async fn list_portfolios(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserPortfolio>>, ApiError> {
    let rows = state.store.list_all_holdings().await?;
    Ok(Json(group_by_user(rows)))
}

#[instrument(skip(state, id))]
pub async fn user_portfolio(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Vec<PositionView>>, ApiError> {
    let Path(id) = id?;
    let user_id: i64 = id
        .parse()
        .map_err(|_| ApiError::invalid_input("invalid user id"))?;
    Ok(Json(positions_of(&state, user_id).await?))
}

/// Folds joined rows into one entry per user id, keeping row order.
/// Users without holdings arrive as a single row with no symbol and get an empty list.
fn group_by_user(rows: Vec<HoldingRow>) -> Vec<UserPortfolio> {
    let mut out: Vec<UserPortfolio> = Vec::new();
    for row in rows {
        if out.last().map(|last| last.user_id) != Some(row.user_id) {
            out.push(UserPortfolio {
                user_id: row.user_id,
                email: row.email.clone(),
                portfolio: Vec::new(),
            });
        }
        let Some(entry) = out.last_mut() else {
            continue;
        };
        if let Some(symbol) = row.symbol {
            entry.portfolio.push(PositionView {
                symbol,
                quantity: row.quantity,
                avg_buy_price: row.avg_buy_price,
                last_price: row.last_price,
            });
        }
    }
    out
}
