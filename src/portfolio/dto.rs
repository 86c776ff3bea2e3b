use serde::{Deserialize, Serialize};

use crate::db::Position;

/// Body of `POST /portfolio`. The caller supplies the final quantity and average price.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertPositionRequest {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default, alias = "avg_buy_price")]
    pub avg_buy_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionView {
    pub symbol: String,
    pub quantity: Option<f64>,
    pub avg_buy_price: Option<f64>,
    pub last_price: Option<f64>,
}

impl From<Position> for PositionView {
    fn from(p: Position) -> Self {
        Self {
            symbol: p.symbol,
            quantity: p.quantity,
            avg_buy_price: p.avg_buy_price,
            last_price: p.last_price,
        }
    }
}
