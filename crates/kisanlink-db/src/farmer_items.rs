//! Farmer item (offering) reads.

use kisanlink_core::Offering;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{stored_coordinate, DbError};

/// A row from the `farmer_items` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FarmerItemRow {
    pub id: i64,
    pub farmer_id: i64,
    pub item_name: String,
    pub price: Decimal,
    pub photo_path: Option<String>,
    pub location: Option<String>,
    pub min_order_qty: i32,
    pub available_stock: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<FarmerItemRow> for Offering {
    fn from(row: FarmerItemRow) -> Self {
        Self {
            id: row.id,
            seller_id: row.farmer_id,
            coordinate: stored_coordinate("farmer_items", row.id, row.latitude, row.longitude),
            item_name: row.item_name,
            price: row.price,
            min_order_qty: row.min_order_qty,
            available_stock: row.available_stock,
            photo_path: row.photo_path,
            location: row.location,
        }
    }
}

/// List farmer items ordered by id, optionally restricted to one farmer.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_farmer_items(
    pool: &PgPool,
    farmer_id: Option<i64>,
) -> Result<Vec<FarmerItemRow>, DbError> {
    let rows = sqlx::query_as::<_, FarmerItemRow>(
        "SELECT id, farmer_id, item_name, price, photo_path, location, \
                min_order_qty, available_stock, latitude, longitude \
         FROM farmer_items \
         WHERE ($1::bigint IS NULL OR farmer_id = $1) \
         ORDER BY id",
    )
    .bind(farmer_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
