use anyhow::Context;
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;

pub const DEFAULT_JWT_SECRET: &str = "secret";

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection string; when set the individual parts are ignored.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset or empty keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.into());

        let database = DatabaseConfig {
            url: var("DATABASE_URL"),
            host: or("DB_HOST", "postgres"),
            port: or("DB_PORT", "5432").parse().context("DB_PORT")?,
            user: or("DB_USER", "admin"),
            password: or("DB_PASSWORD", "adminpassword"),
            name: or("DB_NAME", "stocks"),
            max_connections: or("DB_MAX_CONNECTIONS", "10")
                .parse()
                .context("DB_MAX_CONNECTIONS")?,
        };
        let jwt = JwtConfig {
            secret: or("JWT_SECRET", DEFAULT_JWT_SECRET),
            issuer: or("JWT_ISSUER", "stocktrack"),
            audience: or("JWT_AUDIENCE", "stocktrack-users"),
            ttl_minutes: or("JWT_TTL_MINUTES", "1440")
                .parse()
                .context("JWT_TTL_MINUTES")?,
        };
        Ok(Self {
            database,
            jwt,
            host: or("APP_HOST", "0.0.0.0"),
            port: or("APP_PORT", "8080").parse().context("APP_PORT")?,
        })
    }
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> anyhow::Result<PgConnectOptions> {
        if let Some(url) = &self.url {
            return url.parse().context("parse DATABASE_URL");
        }
        Ok(PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name))
    }
}
