//! Distance ranking of farmers and farmer items around an origin.

use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};

use crate::{haversine_km, round_km, Coordinate, CoreError, NamedLocationTable};

/// Anything that can be placed on the map: a farmer or one of their items.
pub trait LocatedEntity {
    fn id(&self) -> i64;

    fn display_name(&self) -> &str;

    /// Explicit coordinate, if the row has one.
    fn coordinate(&self) -> Option<Coordinate>;

    /// Free-text location used as a fallback through the named location table.
    fn location_name(&self) -> Option<&str>;

    /// Explicit coordinate, else the table lookup of the free-text location.
    fn resolve_coordinate(&self, table: &NamedLocationTable) -> Option<Coordinate> {
        self.coordinate()
            .or_else(|| self.location_name().and_then(|name| table.resolve(name)))
    }
}

/// A farmer account as seen by consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub coordinate: Option<Coordinate>,
}

impl LocatedEntity for Seller {
    fn id(&self) -> i64 {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate
    }

    fn location_name(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

/// An item listed by a farmer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offering {
    pub id: i64,
    pub seller_id: i64,
    pub item_name: String,
    pub price: Decimal,
    #[serde(default = "default_min_order_qty")]
    pub min_order_qty: i32,
    #[serde(default)]
    pub available_stock: i32,
    #[serde(default)]
    pub photo_path: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub coordinate: Option<Coordinate>,
}

fn default_min_order_qty() -> i32 {
    1
}

impl LocatedEntity for Offering {
    fn id(&self) -> i64 {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.item_name
    }

    fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate
    }

    fn location_name(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

/// An entity decorated with its distance from the ranking origin.
///
/// `distance_km` is `None` when either endpoint could not be located. It is
/// kept at full precision; rounding to two decimals happens on serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult<T> {
    pub entity: T,
    pub distance_km: Option<f64>,
}

impl<T> RankedResult<T> {
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.distance_km.is_some()
    }
}

impl<T: Serialize> Serialize for RankedResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a, T> {
            #[serde(flatten)]
            entity: &'a T,
            distance_km: Option<f64>,
            distance_known: bool,
        }

        Wire {
            entity: &self.entity,
            distance_km: self.distance_km.map(round_km),
            distance_known: self.is_known(),
        }
        .serialize(serializer)
    }
}

/// Rank `entities` by great-circle distance from `origin`.
///
/// Entities without an explicit coordinate are resolved through `table`;
/// those that still cannot be located get an unknown distance and sort after
/// every located entity. The sort is stable, so input order breaks ties.
///
/// With a `max_distance_km` cutoff, entities farther than the cutoff and all
/// entities with an unknown distance are dropped.
///
/// # Errors
///
/// Returns [`CoreError::InvalidInput`] when the cutoff is negative or not finite.
pub fn rank_by_distance<T, I>(
    origin: &Coordinate,
    entities: I,
    max_distance_km: Option<f64>,
    table: &NamedLocationTable,
) -> Result<Vec<RankedResult<T>>, CoreError>
where
    T: LocatedEntity,
    I: IntoIterator<Item = T>,
{
    if let Some(cutoff) = max_distance_km {
        if !cutoff.is_finite() || cutoff < 0.0 {
            return Err(CoreError::invalid(format!(
                "max_distance_km must be a non-negative number, got {cutoff}"
            )));
        }
    }

    let mut unresolved = 0usize;
    let mut ranked: Vec<RankedResult<T>> = entities
        .into_iter()
        .map(|entity| {
            let distance_km = entity
                .resolve_coordinate(table)
                .map(|coordinate| haversine_km(origin, &coordinate));
            if distance_km.is_none() {
                unresolved += 1;
                tracing::debug!(
                    id = entity.id(),
                    name = entity.display_name(),
                    "entity location could not be resolved"
                );
            }
            RankedResult {
                entity,
                distance_km,
            }
        })
        .filter(|result| match (max_distance_km, result.distance_km) {
            (None, _) => true,
            (Some(cutoff), Some(distance)) => distance <= cutoff,
            (Some(_), None) => false,
        })
        .collect();

    ranked.sort_by(|a, b| compare_distance(a.distance_km, b.distance_km));

    tracing::debug!(
        ranked = ranked.len(),
        unresolved,
        cutoff = ?max_distance_km,
        "ranked entities by distance"
    );
    Ok(ranked)
}

/// Entities within `max_distance_km` of `origin`, nearest first.
///
/// # Errors
///
/// Same as [`rank_by_distance`].
pub fn nearby<T, I>(
    origin: &Coordinate,
    entities: I,
    max_distance_km: f64,
    table: &NamedLocationTable,
) -> Result<Vec<RankedResult<T>>, CoreError>
where
    T: LocatedEntity,
    I: IntoIterator<Item = T>,
{
    rank_by_distance(origin, entities, Some(max_distance_km), table)
}

/// Known distances ascending, unknown last.
fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
#[path = "ranking_test.rs"]
mod tests;
