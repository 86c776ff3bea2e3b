use sqlx::FromRow;
use time::OffsetDateTime;

use crate::auth::claims::Role;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String, // argon2 PHC string, never serialized
    pub role: String,
    pub created_at: OffsetDateTime,
}

impl User {
    pub fn role(&self) -> Role {
        Role::from_db(&self.role)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow)]
pub struct Preferences {
    pub preferred_markets: Vec<String>,
    pub watchlist: Vec<String>,
    pub onboarding_completed: bool,
}

#[derive(Debug, Clone)]
pub struct PositionUpsert {
    pub user_id: i64,
    pub symbol: String,
    pub quantity: f64,
    pub avg_buy_price: f64,
}

/// A holding joined with the latest close of its symbol.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Position {
    pub symbol: String,
    pub quantity: Option<f64>,
    pub avg_buy_price: Option<f64>,
    pub last_price: Option<f64>,
}

/// One row of users LEFT JOIN portfolios; holding columns are null for users without any.
#[derive(Debug, Clone, FromRow)]
pub struct HoldingRow {
    pub user_id: i64,
    pub email: String,
    pub symbol: Option<String>,
    pub quantity: Option<f64>,
    pub avg_buy_price: Option<f64>,
    pub last_price: Option<f64>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Quote {
    pub symbol: String,
    pub ts: OffsetDateTime,
    pub close: Option<f64>,
    pub volume: Option<i64>,
}

#[derive(Debug, Clone, FromRow)]
pub struct PricePoint {
    pub symbol: String,
    pub ts: OffsetDateTime,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<i64>,
}
