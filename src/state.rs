use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::warn;

use crate::auth::jwt::JwtKeys;
use crate::config::{AppConfig, DEFAULT_JWT_SECRET};
use crate::db::{postgres::PgStore, Store};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
    pub jwt: JwtKeys,
}

impl AppState {
    /// Connects the pool and returns it alongside the state so `main` can run migrations.
    pub async fn init() -> anyhow::Result<(Self, PgStore)> {
        let config = Arc::new(AppConfig::from_env()?);
        if config.jwt.secret == DEFAULT_JWT_SECRET {
            warn!("JWT_SECRET not set; signing tokens with the built-in default secret");
        }

        let pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect_with(config.database.connect_options()?)
            .await
            .context("connect to database")?;
        let store = PgStore::new(pool);

        let state = Self::from_parts(Arc::new(store.clone()), config);
        Ok((state, store))
    }

    pub fn from_parts(store: Arc<dyn Store>, config: Arc<AppConfig>) -> Self {
        let jwt = JwtKeys::from_config(&config.jwt);
        Self { store, config, jwt }
    }
}
