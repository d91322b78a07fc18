//! Append-only purchase history.

use chrono::{DateTime, Utc};
use kisanlink_core::PurchaseHistoryEntry;
use sqlx::PgPool;

use crate::DbError;

/// A row from the `purchase_history` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PurchaseRow {
    pub id: i64,
    pub consumer_id: i64,
    pub item_id: i64,
    pub purchased_at: DateTime<Utc>,
}

impl From<PurchaseRow> for PurchaseHistoryEntry {
    fn from(row: PurchaseRow) -> Self {
        Self {
            consumer_id: row.consumer_id,
            item_id: row.item_id,
            purchased_at: row.purchased_at,
        }
    }
}

/// All purchases by a consumer, oldest first. Empty when there are none.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_purchase_history(
    pool: &PgPool,
    consumer_id: i64,
) -> Result<Vec<PurchaseRow>, DbError> {
    let rows = sqlx::query_as::<_, PurchaseRow>(
        "SELECT id, consumer_id, item_id, purchased_at \
         FROM purchase_history \
         WHERE consumer_id = $1 \
         ORDER BY purchased_at, id",
    )
    .bind(consumer_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Append a purchase of `item_id` by `consumer_id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the consumer or the item does not
/// exist, or [`DbError::Sqlx`] if the insert fails.
pub async fn record_purchase(
    pool: &PgPool,
    consumer_id: i64,
    item_id: i64,
) -> Result<PurchaseRow, DbError> {
    sqlx::query_as::<_, PurchaseRow>(
        "INSERT INTO purchase_history (consumer_id, item_id) \
         SELECT u.id, fi.id \
         FROM users u, farmer_items fi \
         WHERE u.id = $1 AND u.user_type = 'consumer' AND fi.id = $2 \
         RETURNING id, consumer_id, item_id, purchased_at",
    )
    .bind(consumer_id)
    .bind(item_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}
