//! Demo marketplace data for local development.

use kisanlink_core::NamedLocationTable;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

/// Row counts written by [`seed_demo_marketplace`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub farmers: usize,
    pub items: usize,
    pub consumers: usize,
}

struct DemoFarmer {
    fullname: &'static str,
    email: &'static str,
    location: &'static str,
    items: &'static [(&'static str, i64, i32)],
}

// (item name, price in paisa, available stock)
const DEMO_FARMERS: &[DemoFarmer] = &[
    DemoFarmer {
        fullname: "Ram Bahadur Thapa",
        email: "ram.thapa@example.com",
        location: "Naya Thimi",
        items: &[("Tomatoes", 8_000, 120), ("Cauliflower", 6_500, 40)],
    },
    DemoFarmer {
        fullname: "Sunita Maharjan",
        email: "sunita.maharjan@example.com",
        location: "Lokanthali",
        items: &[("Spinach", 4_000, 60), ("Potatoes", 5_500, 300)],
    },
    DemoFarmer {
        fullname: "Hari Prasad Khadka",
        email: "hari.khadka@example.com",
        location: "Gatthaghar",
        items: &[("Cucumbers", 7_000, 80)],
    },
    DemoFarmer {
        fullname: "Maya Gurung",
        email: "maya.gurung@example.com",
        location: "Kausaltar",
        items: &[("Green Chilies", 12_000, 25), ("Onions", 9_000, 150)],
    },
    DemoFarmer {
        fullname: "Bikash Tamang",
        email: "bikash.tamang@example.com",
        location: "Unknownville",
        items: &[("Radish", 3_500, 90)],
    },
];

// (fullname, email, location, login count)
const DEMO_CONSUMERS: &[(&str, &str, &str, i32)] = &[
    ("Sita Shrestha", "sita.shrestha@example.com", "Naya Thimi", 1),
    ("Gita Karki", "gita.karki@example.com", "Lokanthali", 4),
];

/// Upsert demo farmers, their items, and consumers.
///
/// Coordinates are resolved from each account's location through `locations`,
/// the same way signup does; unresolvable locations are stored without
/// coordinates. Everything runs in one transaction and is safe to re-run.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails.
pub async fn seed_demo_marketplace(
    pool: &PgPool,
    locations: &NamedLocationTable,
) -> Result<SeedSummary, DbError> {
    let mut tx = pool.begin().await?;
    let mut summary = SeedSummary::default();

    for farmer in DEMO_FARMERS {
        let coordinate = locations.resolve(farmer.location);
        let farmer_id: i64 = sqlx::query_scalar(
            "INSERT INTO users (fullname, email, user_type, location, latitude, longitude) \
             VALUES ($1, $2, 'farmer', $3, $4, $5) \
             ON CONFLICT (email) DO UPDATE SET \
                 fullname = EXCLUDED.fullname, \
                 location = EXCLUDED.location, \
                 latitude = EXCLUDED.latitude, \
                 longitude = EXCLUDED.longitude, \
                 updated_at = NOW() \
             RETURNING id",
        )
        .bind(farmer.fullname)
        .bind(farmer.email)
        .bind(farmer.location)
        .bind(coordinate.map(|c| c.lat()))
        .bind(coordinate.map(|c| c.lon()))
        .fetch_one(&mut *tx)
        .await?;
        summary.farmers += 1;

        for &(item_name, price_paisa, stock) in farmer.items {
            sqlx::query(
                "INSERT INTO farmer_items \
                     (farmer_id, item_name, price, location, available_stock, latitude, longitude) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) \
                 ON CONFLICT (farmer_id, item_name) DO UPDATE SET \
                     price = EXCLUDED.price, \
                     location = EXCLUDED.location, \
                     available_stock = EXCLUDED.available_stock, \
                     latitude = EXCLUDED.latitude, \
                     longitude = EXCLUDED.longitude, \
                     updated_at = NOW()",
            )
            .bind(farmer_id)
            .bind(item_name)
            .bind(Decimal::new(price_paisa, 2))
            .bind(farmer.location)
            .bind(stock)
            .bind(coordinate.map(|c| c.lat()))
            .bind(coordinate.map(|c| c.lon()))
            .execute(&mut *tx)
            .await?;
            summary.items += 1;
        }
    }

    for &(fullname, email, location, login_count) in DEMO_CONSUMERS {
        let coordinate = locations.resolve(location);
        sqlx::query(
            "INSERT INTO users (fullname, email, user_type, location, latitude, longitude, login_count) \
             VALUES ($1, $2, 'consumer', $3, $4, $5, $6) \
             ON CONFLICT (email) DO UPDATE SET \
                 fullname = EXCLUDED.fullname, \
                 location = EXCLUDED.location, \
                 latitude = EXCLUDED.latitude, \
                 longitude = EXCLUDED.longitude, \
                 updated_at = NOW()",
        )
        .bind(fullname)
        .bind(email)
        .bind(location)
        .bind(coordinate.map(|c| c.lat()))
        .bind(coordinate.map(|c| c.lon()))
        .bind(login_count)
        .execute(&mut *tx)
        .await?;
        summary.consumers += 1;
    }

    tx.commit().await?;

    tracing::info!(
        farmers = summary.farmers,
        items = summary.items,
        consumers = summary.consumers,
        "seeded demo marketplace"
    );
    Ok(summary)
}
