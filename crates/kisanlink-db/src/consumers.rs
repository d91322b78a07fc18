//! Consumer reads and the login counter.

use chrono::{DateTime, Utc};
use kisanlink_core::ConsumerProfile;
use sqlx::PgPool;

use crate::{stored_coordinate, DbError};

/// A consumer row from the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ConsumerRow {
    pub id: i64,
    pub fullname: String,
    pub email: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub login_count: i32,
    pub created_at: DateTime<Utc>,
}

impl From<ConsumerRow> for ConsumerProfile {
    fn from(row: ConsumerRow) -> Self {
        Self {
            id: row.id,
            coordinate: stored_coordinate("users", row.id, row.latitude, row.longitude),
            fullname: row.fullname,
            login_count: u32::try_from(row.login_count).unwrap_or(0),
            location: row.location,
        }
    }
}

/// Fetch a consumer by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no consumer has this id, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_consumer(pool: &PgPool, consumer_id: i64) -> Result<ConsumerRow, DbError> {
    sqlx::query_as::<_, ConsumerRow>(
        "SELECT id, fullname, email, location, latitude, longitude, login_count, created_at \
         FROM users \
         WHERE id = $1 AND user_type = 'consumer'",
    )
    .bind(consumer_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Increment a consumer's login counter by one and return the new value.
///
/// Called once per successful authentication.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no consumer has this id, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn record_consumer_login(pool: &PgPool, consumer_id: i64) -> Result<i32, DbError> {
    sqlx::query_scalar::<_, i32>(
        "UPDATE users \
         SET login_count = login_count + 1, updated_at = NOW() \
         WHERE id = $1 AND user_type = 'consumer' \
         RETURNING login_count",
    )
    .bind(consumer_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}
