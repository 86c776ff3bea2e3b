//! Persistence seam: every query the handlers issue goes through [`Store`].

use async_trait::async_trait;

pub mod models;
pub mod postgres;

#[cfg(test)]
pub mod memory;

pub use models::{HoldingRow, Position, PositionUpsert, Preferences, PricePoint, Quote, User};

/// Most recent samples returned by a history query.
pub const HISTORY_LIMIT: i64 = 300;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated")]
    UniqueViolation,
    #[error(transparent)]
    Database(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::UniqueViolation,
            _ => StoreError::Database(e),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait Store: Send + Sync {
    /// Inserts a user with role "user"; a taken email yields `UniqueViolation`.
    async fn create_user(&self, email: &str, password_hash: &str) -> StoreResult<User>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    /// All users, newest first.
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    /// Inserts the default preferences row unless one already exists.
    async fn ensure_preferences(&self, user_id: i64) -> StoreResult<()>;
    async fn get_preferences(&self, user_id: i64) -> StoreResult<Option<Preferences>>;
    /// Replaces every preference field in one statement.
    async fn upsert_preferences(&self, user_id: i64, prefs: &Preferences) -> StoreResult<()>;

    /// Inserts or fully replaces the (user, symbol) holding.
    async fn upsert_position(&self, position: &PositionUpsert) -> StoreResult<()>;
    /// Holdings of one user ordered by symbol, with the latest close per symbol.
    async fn list_positions(&self, user_id: i64) -> StoreResult<Vec<Position>>;
    /// Every user left-joined with their holdings, ordered by email then symbol.
    async fn list_all_holdings(&self) -> StoreResult<Vec<HoldingRow>>;

    /// Most recent sample per symbol, ordered by symbol.
    async fn latest_quotes(&self) -> StoreResult<Vec<Quote>>;
    /// Up to `limit` most recent samples of one symbol, newest first.
    async fn price_history(&self, symbol: &str, limit: i64) -> StoreResult<Vec<PricePoint>>;
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use sqlx::error::{DatabaseError, ErrorKind};

    use super::StoreError;

    #[derive(Debug)]
    struct ConstraintError {
        unique: bool,
    }

    impl fmt::Display for ConstraintError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("constraint failed")
        }
    }

    impl std::error::Error for ConstraintError {}

    impl DatabaseError for ConstraintError {
        fn message(&self) -> &str {
            "constraint failed"
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            if self.unique {
                ErrorKind::UniqueViolation
            } else {
                ErrorKind::ForeignKeyViolation
            }
        }
    }

    fn db_error(unique: bool) -> sqlx::Error {
        sqlx::Error::Database(Box::new(ConstraintError { unique }))
    }

    #[test]
    fn unique_violation_is_classified() {
        assert!(matches!(
            StoreError::from(db_error(true)),
            StoreError::UniqueViolation
        ));
    }

    #[test]
    fn other_constraint_errors_stay_database_errors() {
        assert!(matches!(
            StoreError::from(db_error(false)),
            StoreError::Database(sqlx::Error::Database(_))
        ));
        assert!(matches!(
            StoreError::from(sqlx::Error::RowNotFound),
            StoreError::Database(sqlx::Error::RowNotFound)
        ));
    }
}
