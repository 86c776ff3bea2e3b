//! In-memory `Store` with the same ordering and upsert semantics as `PgStore`.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use super::{
    HoldingRow, Position, PositionUpsert, Preferences, PricePoint, Quote, Store, StoreError,
    StoreResult, User,
};

#[derive(Default)]
struct Inner {
    next_id: i64,
    users: Vec<User>,
    preferences: HashMap<i64, Preferences>,
    positions: BTreeMap<(i64, String), (f64, f64, OffsetDateTime)>,
    prices: Vec<PricePoint>,
    fail_preferences: bool,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_role(&self, email: &str, role: &str) {
        let mut inner = self.lock();
        if let Some(user) = inner.users.iter_mut().find(|u| u.email == email) {
            user.role = role.to_string();
        }
    }

    pub fn add_price(&self, point: PricePoint) {
        self.lock().prices.push(point);
    }

    /// Makes every preferences write fail.
    pub fn fail_preferences(&self, fail: bool) {
        self.lock().fail_preferences = fail;
    }

    pub fn preferences_rows(&self, user_id: i64) -> usize {
        usize::from(self.lock().preferences.contains_key(&user_id))
    }

    pub fn position_rows(&self, user_id: i64) -> usize {
        self.lock()
            .positions
            .keys()
            .filter(|(uid, _)| *uid == user_id)
            .count()
    }

    fn last_close(prices: &[PricePoint], symbol: &str) -> Option<f64> {
        prices
            .iter()
            .filter(|p| p.symbol == symbol)
            .max_by_key(|p| p.ts)
            .and_then(|p| p.close)
    }
}

fn unavailable() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> StoreResult<User> {
        let mut inner = self.lock();
        if inner.users.iter().any(|u| u.email == email) {
            return Err(StoreError::UniqueViolation);
        }
        inner.next_id += 1;
        let user = User {
            id: inner.next_id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role: "user".into(),
            created_at: OffsetDateTime::now_utc(),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let mut users = self.lock().users.clone();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(users)
    }

    async fn ensure_preferences(&self, user_id: i64) -> StoreResult<()> {
        let mut inner = self.lock();
        if inner.fail_preferences {
            return Err(unavailable());
        }
        inner.preferences.entry(user_id).or_default();
        Ok(())
    }

    async fn get_preferences(&self, user_id: i64) -> StoreResult<Option<Preferences>> {
        Ok(self.lock().preferences.get(&user_id).cloned())
    }

    async fn upsert_preferences(&self, user_id: i64, prefs: &Preferences) -> StoreResult<()> {
        let mut inner = self.lock();
        if inner.fail_preferences {
            return Err(unavailable());
        }
        inner.preferences.insert(user_id, prefs.clone());
        Ok(())
    }

    async fn upsert_position(&self, position: &PositionUpsert) -> StoreResult<()> {
        self.lock().positions.insert(
            (position.user_id, position.symbol.clone()),
            (
                position.quantity,
                position.avg_buy_price,
                OffsetDateTime::now_utc(),
            ),
        );
        Ok(())
    }

    async fn list_positions(&self, user_id: i64) -> StoreResult<Vec<Position>> {
        let inner = self.lock();
        Ok(inner
            .positions
            .iter()
            .filter(|((uid, _), _)| *uid == user_id)
            .map(|((_, symbol), (qty, avg, _))| Position {
                symbol: symbol.clone(),
                quantity: Some(*qty),
                avg_buy_price: Some(*avg),
                last_price: Self::last_close(&inner.prices, symbol),
            })
            .collect())
    }

    async fn list_all_holdings(&self) -> StoreResult<Vec<HoldingRow>> {
        let inner = self.lock();
        let mut users: Vec<&User> = inner.users.iter().collect();
        users.sort_by(|a, b| a.email.cmp(&b.email).then(a.id.cmp(&b.id)));

        let mut rows = Vec::new();
        for user in users {
            let held: Vec<_> = inner
                .positions
                .iter()
                .filter(|((uid, _), _)| *uid == user.id)
                .collect();
            if held.is_empty() {
                rows.push(HoldingRow {
                    user_id: user.id,
                    email: user.email.clone(),
                    symbol: None,
                    quantity: None,
                    avg_buy_price: None,
                    last_price: None,
                });
            }
            for ((_, symbol), (qty, avg, _)) in held {
                rows.push(HoldingRow {
                    user_id: user.id,
                    email: user.email.clone(),
                    symbol: Some(symbol.clone()),
                    quantity: Some(*qty),
                    avg_buy_price: Some(*avg),
                    last_price: Self::last_close(&inner.prices, symbol),
                });
            }
        }
        Ok(rows)
    }

    async fn latest_quotes(&self) -> StoreResult<Vec<Quote>> {
        let inner = self.lock();
        let mut latest: BTreeMap<&str, &PricePoint> = BTreeMap::new();
        for p in &inner.prices {
            let entry = latest.entry(p.symbol.as_str()).or_insert(p);
            if p.ts > entry.ts {
                *entry = p;
            }
        }
        Ok(latest
            .into_values()
            .map(|p| Quote {
                symbol: p.symbol.clone(),
                ts: p.ts,
                close: p.close,
                volume: p.volume,
            })
            .collect())
    }

    async fn price_history(&self, symbol: &str, limit: i64) -> StoreResult<Vec<PricePoint>> {
        let mut rows: Vec<PricePoint> = self
            .lock()
            .prices
            .iter()
            .filter(|p| p.symbol == symbol)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.ts.cmp(&a.ts));
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }
}
