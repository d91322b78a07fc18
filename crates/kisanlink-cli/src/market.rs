//! Ranking, recommendation, and location commands. Results are printed to
//! stdout as pretty JSON.

use std::path::Path;

use kisanlink_core::{
    load_locations, rank_by_distance, recommend, shadowed_entries, ConsumerProfile, Coordinate,
    CoreError, NamedLocationTable, Offering, PurchaseHistoryEntry, RecommendationInputs, Seller,
};
use serde::Serialize;

pub(crate) fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Load the table from `path`, or the built-in table when `None`.
pub(crate) fn location_table(path: Option<&Path>) -> anyhow::Result<NamedLocationTable> {
    match path {
        Some(path) => Ok(load_locations(path)?),
        None => Ok(NamedLocationTable::default()),
    }
}

pub(crate) fn locations_json(table: &NamedLocationTable) -> anyhow::Result<String> {
    let entries: Vec<_> = table.entries().collect();
    to_pretty_json(&entries)
}

/// Print the named location table, warning about entries that can only be
/// matched by their full name.
pub(crate) fn run_locations_list(path: Option<&Path>) -> anyhow::Result<()> {
    let table = location_table(path)?;
    for name in shadowed_entries(&table) {
        tracing::warn!(name = %name, "location shares its first word with an earlier entry");
    }
    println!("{}", locations_json(&table)?);
    Ok(())
}

/// Rank every farmer by distance from `lat`/`lon`.
///
/// # Errors
///
/// Returns an error for an invalid origin or cutoff, or if the farmer list
/// cannot be read.
pub(crate) async fn run_rank(
    pool: &sqlx::PgPool,
    config: &kisanlink_core::AppConfig,
    lat: f64,
    lon: f64,
    max_distance_km: Option<f64>,
) -> anyhow::Result<()> {
    let origin = Coordinate::new(lat, lon)?;
    let locations = config.location_table()?;

    let sellers = kisanlink_db::list_farmers(pool)
        .await?
        .into_iter()
        .map(Seller::from);
    let ranked = rank_by_distance(&origin, sellers, max_distance_km, &locations)?;

    println!("{}", to_pretty_json(&ranked)?);
    Ok(())
}

/// Run the recommendation selector for one consumer.
///
/// # Errors
///
/// Returns [`CoreError::UnknownConsumer`] if the id is not a consumer, or any
/// error raised by the selector.
pub(crate) async fn run_recommend(
    pool: &sqlx::PgPool,
    config: &kisanlink_core::AppConfig,
    consumer_id: i64,
) -> anyhow::Result<()> {
    let locations = config.location_table()?;

    let consumer: ConsumerProfile = match kisanlink_db::get_consumer(pool, consumer_id).await {
        Ok(row) => row.into(),
        Err(kisanlink_db::DbError::NotFound) => {
            return Err(CoreError::UnknownConsumer(consumer_id).into())
        }
        Err(e) => return Err(e.into()),
    };
    let history: Vec<PurchaseHistoryEntry> = kisanlink_db::list_purchase_history(pool, consumer_id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let sellers: Vec<Seller> = kisanlink_db::list_farmers(pool)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    let offerings: Vec<Offering> = kisanlink_db::list_farmer_items(pool, None)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let recommendation = recommend(
        &consumer,
        &RecommendationInputs {
            history: &history,
            sellers: &sellers,
            offerings: &offerings,
            locations: &locations,
            limit: config.recommend_limit,
        },
    )?;

    println!("{}", to_pretty_json(&recommendation)?);
    Ok(())
}
