//! Farmer reads.

use kisanlink_core::Seller;
use sqlx::PgPool;

use crate::{stored_coordinate, DbError};

/// A farmer row from the `users` table.
///
/// Rows without coordinates are included; the ranker resolves them from
/// `location` or reports an unknown distance.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FarmerRow {
    pub id: i64,
    pub fullname: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<FarmerRow> for Seller {
    fn from(row: FarmerRow) -> Self {
        Self {
            id: row.id,
            coordinate: stored_coordinate("users", row.id, row.latitude, row.longitude),
            name: row.fullname,
            location: row.location,
        }
    }
}

/// List all farmers, ordered by id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_farmers(pool: &PgPool) -> Result<Vec<FarmerRow>, DbError> {
    let rows = sqlx::query_as::<_, FarmerRow>(
        "SELECT id, fullname, location, latitude, longitude \
         FROM users \
         WHERE user_type = 'farmer' \
         ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
