use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};
use thiserror::Error;

pub mod consumers;
pub mod farmer_items;
pub mod farmers;
pub mod purchases;
pub mod seed;

pub use consumers::{get_consumer, record_consumer_login, ConsumerRow};
pub use farmer_items::{list_farmer_items, FarmerItemRow};
pub use farmers::{list_farmers, FarmerRow};
pub use purchases::{list_purchase_history, record_purchase, PurchaseRow};
pub use seed::{seed_demo_marketplace, SeedSummary};

const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 1;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 10;

// Path relative to crates/kisanlink-db/Cargo.toml; resolves to <workspace-root>/migrations/
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

#[derive(Debug, Clone, Copy)]
pub struct PoolConfig {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            acquire_timeout_secs: DEFAULT_ACQUIRE_TIMEOUT_SECS,
        }
    }
}

impl PoolConfig {
    #[must_use]
    pub fn from_app_config(config: &kisanlink_core::AppConfig) -> Self {
        Self {
            max_connections: config.db_max_connections,
            min_connections: config.db_min_connections,
            acquire_timeout_secs: config.db_acquire_timeout_secs,
        }
    }

    /// Read pool settings from `KISANLINK_DB_*`, using defaults for unset vars.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidEnvVar`] if a set value does not parse, the
    /// same values `kisanlink_core::load_app_config` rejects.
    pub fn from_env() -> Result<Self, DbError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Like [`PoolConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidEnvVar`] if a set value does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DbError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            max_connections: read_var(
                &lookup,
                "KISANLINK_DB_MAX_CONNECTIONS",
                DEFAULT_MAX_CONNECTIONS,
            )?,
            min_connections: read_var(
                &lookup,
                "KISANLINK_DB_MIN_CONNECTIONS",
                DEFAULT_MIN_CONNECTIONS,
            )?,
            acquire_timeout_secs: read_var(
                &lookup,
                "KISANLINK_DB_ACQUIRE_TIMEOUT_SECS",
                DEFAULT_ACQUIRE_TIMEOUT_SECS,
            )?,
        })
    }
}

#[derive(Debug, Error)]
pub enum DbError {
    #[error("DATABASE_URL is not set")]
    MissingDatabaseUrl,
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Connect to a Postgres pool using explicit URL and config.
///
/// Connections are checked out per query and returned to the pool when the
/// query future completes or is dropped.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the connection cannot be established.
pub async fn connect_pool(database_url: &str, config: PoolConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(database_url)
        .await
}

/// Connect to a Postgres pool, reading `DATABASE_URL` and pool settings from env.
///
/// # Errors
///
/// Returns [`DbError::MissingDatabaseUrl`] if `DATABASE_URL` is unset,
/// [`DbError::InvalidEnvVar`] for an unparseable pool setting, or
/// [`DbError::Sqlx`] if the connection cannot be established.
pub async fn connect_pool_from_env() -> Result<PgPool, DbError> {
    let database_url = env::var("DATABASE_URL").map_err(|_| DbError::MissingDatabaseUrl)?;
    let config = PoolConfig::from_env()?;
    connect_pool(&database_url, config)
        .await
        .map_err(DbError::from)
}

/// Run all pending migrations against the pool.
///
/// Returns the number of migrations that were applied.
///
/// # Errors
///
/// Returns [`sqlx::migrate::MigrateError`] if any migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<usize, sqlx::migrate::MigrateError> {
    // _sqlx_migrations does not exist on a fresh database; treat that as zero applied.
    let applied_before = count_applied_migrations(pool).await;
    MIGRATOR.run(pool).await?;
    let applied_after = count_applied_migrations(pool).await;

    let delta = (applied_after - applied_before).max(0);
    Ok(usize::try_from(delta).unwrap_or(0))
}

async fn count_applied_migrations(pool: &PgPool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
        .fetch_one(pool)
        .await
        .unwrap_or(0)
}

/// Send a `SELECT 1` to verify the pool has a live connection.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await?;
    Ok(())
}

/// Ping the pool and return a typed error on failure.
///
/// # Errors
///
/// Returns [`DbError`] if the ping fails.
pub async fn health_check(pool: &PgPool) -> Result<(), DbError> {
    ping(pool).await?;
    Ok(())
}

/// Build a coordinate from nullable columns, treating invalid stored values
/// as unknown.
pub(crate) fn stored_coordinate(
    table: &'static str,
    id: i64,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Option<kisanlink_core::Coordinate> {
    match kisanlink_core::Coordinate::from_parts(latitude, longitude) {
        Ok(coordinate) => coordinate,
        Err(e) => {
            tracing::warn!(table, id, error = %e, "ignoring invalid stored coordinate");
            None
        }
    }
}

fn read_var<F, T>(lookup: &F, var: &str, default: T) -> Result<T, DbError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        Some(value) => value.parse::<T>().map_err(|e| DbError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
