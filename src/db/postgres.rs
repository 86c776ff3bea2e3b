use async_trait::async_trait;
use sqlx::PgPool;

use super::{
    HoldingRow, Position, PositionUpsert, Preferences, PricePoint, Quote, Store, StoreResult, User,
};

/// `Store` backed by a Postgres pool. NUMERIC columns are read as float8 and
/// `stock_prices.ts` (TIMESTAMP) is read as UTC.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> StoreResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, role)
            VALUES ($1, $2, 'user')
            RETURNING id, email, password_hash, role, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, role, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, role, created_at
            FROM users
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn ensure_preferences(&self, user_id: i64) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_preferences (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_preferences(&self, user_id: i64) -> StoreResult<Option<Preferences>> {
        let prefs = sqlx::query_as::<_, Preferences>(
            r#"
            SELECT COALESCE(preferred_markets, '{}') AS preferred_markets,
                   COALESCE(watchlist, '{}') AS watchlist,
                   COALESCE(onboarding_completed, FALSE) AS onboarding_completed
            FROM user_preferences
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(prefs)
    }

    async fn upsert_preferences(&self, user_id: i64, prefs: &Preferences) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_preferences (user_id, preferred_markets, watchlist, onboarding_completed)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE SET
                preferred_markets = EXCLUDED.preferred_markets,
                watchlist = EXCLUDED.watchlist,
                onboarding_completed = EXCLUDED.onboarding_completed
            "#,
        )
        .bind(user_id)
        .bind(&prefs.preferred_markets)
        .bind(&prefs.watchlist)
        .bind(prefs.onboarding_completed)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn upsert_position(&self, position: &PositionUpsert) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO portfolios (user_id, symbol, quantity, avg_buy_price, last_updated)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (user_id, symbol) DO UPDATE SET
                quantity = EXCLUDED.quantity,
                avg_buy_price = EXCLUDED.avg_buy_price,
                last_updated = NOW()
            "#,
        )
        .bind(position.user_id)
        .bind(&position.symbol)
        .bind(position.quantity)
        .bind(position.avg_buy_price)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_positions(&self, user_id: i64) -> StoreResult<Vec<Position>> {
        let rows = sqlx::query_as::<_, Position>(
            r#"
            SELECT p.symbol,
                   p.quantity::float8 AS quantity,
                   p.avg_buy_price::float8 AS avg_buy_price,
                   sp.close::float8 AS last_price
            FROM portfolios p
            LEFT JOIN LATERAL (
                SELECT close FROM stock_prices
                WHERE symbol = p.symbol
                ORDER BY ts DESC
                LIMIT 1
            ) sp ON TRUE
            WHERE p.user_id = $1
            ORDER BY p.symbol
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_all_holdings(&self) -> StoreResult<Vec<HoldingRow>> {
        let rows = sqlx::query_as::<_, HoldingRow>(
            r#"
            SELECT u.id AS user_id,
                   u.email,
                   p.symbol,
                   p.quantity::float8 AS quantity,
                   p.avg_buy_price::float8 AS avg_buy_price,
                   sp.close::float8 AS last_price
            FROM users u
            LEFT JOIN portfolios p ON u.id = p.user_id
            LEFT JOIN LATERAL (
                SELECT close FROM stock_prices
                WHERE symbol = p.symbol
                ORDER BY ts DESC
                LIMIT 1
            ) sp ON TRUE
            ORDER BY u.email, u.id, p.symbol
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn latest_quotes(&self) -> StoreResult<Vec<Quote>> {
        let rows = sqlx::query_as::<_, Quote>(
            r#"
            SELECT DISTINCT ON (sp.symbol)
                   sp.symbol,
                   sp.ts AT TIME ZONE 'UTC' AS ts,
                   sp.close::float8 AS close,
                   sp.volume
            FROM stock_prices sp
            ORDER BY sp.symbol, sp.ts DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn price_history(&self, symbol: &str, limit: i64) -> StoreResult<Vec<PricePoint>> {
        let rows = sqlx::query_as::<_, PricePoint>(
            r#"
            SELECT sp.symbol,
                   sp.ts AT TIME ZONE 'UTC' AS ts,
                   sp.open::float8 AS open,
                   sp.high::float8 AS high,
                   sp.low::float8 AS low,
                   sp.close::float8 AS close,
                   sp.volume
            FROM stock_prices sp
            WHERE sp.symbol = $1
            ORDER BY sp.ts DESC
            LIMIT $2
            "#,
        )
        .bind(symbol)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
