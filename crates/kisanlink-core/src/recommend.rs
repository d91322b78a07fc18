//! Recommendation selector: purchase history for returning consumers,
//! nearest farmer for everyone else.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ranking::{rank_by_distance, Offering, RankedResult, Seller};
use crate::{Coordinate, CoreError, NamedLocationTable};

/// Number of items returned by the history strategy unless configured otherwise.
pub const DEFAULT_RECOMMEND_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumerProfile {
    pub id: i64,
    pub fullname: String,
    /// Successful logins so far, maintained by the auth layer.
    pub login_count: u32,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub coordinate: Option<Coordinate>,
}

impl ConsumerProfile {
    /// Explicit coordinate, else the table lookup of the free-text location.
    #[must_use]
    pub fn resolve_coordinate(&self, table: &NamedLocationTable) -> Option<Coordinate> {
        self.coordinate
            .or_else(|| self.location.as_deref().and_then(|name| table.resolve(name)))
    }
}

/// One purchased item. Append-only; only ever read back for counting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseHistoryEntry {
    pub consumer_id: i64,
    pub item_id: i64,
    pub purchased_at: DateTime<Utc>,
}

/// Whether a consumer has been here before.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerKind {
    New,
    Returning,
}

/// A consumer is returning once they have logged in more than once or bought
/// anything.
#[must_use]
pub fn classify(consumer: &ConsumerProfile, history: &[PurchaseHistoryEntry]) -> CustomerKind {
    if consumer.login_count > 1 || purchases_of(consumer, history).next().is_some() {
        CustomerKind::Returning
    } else {
        CustomerKind::New
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    History,
    Proximity,
}

impl Strategy {
    /// History requires both a purchase record and more than one login;
    /// anything else falls through to proximity.
    #[must_use]
    pub fn select(consumer: &ConsumerProfile, history: &[PurchaseHistoryEntry]) -> Self {
        let has_history = purchases_of(consumer, history).next().is_some();
        if has_history && consumer.login_count > 1 {
            Self::History
        } else {
            Self::Proximity
        }
    }
}

/// Pre-fetched data a recommendation is computed from.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationInputs<'a> {
    pub history: &'a [PurchaseHistoryEntry],
    pub sellers: &'a [Seller],
    pub offerings: &'a [Offering],
    pub locations: &'a NamedLocationTable,
    /// Top-N for the history strategy.
    pub limit: usize,
}

/// Result of [`recommend`], tagged with the strategy that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "strategy_used", rename_all = "snake_case")]
pub enum Recommendation {
    /// Item ids, most frequently purchased first.
    History { items: Vec<i64> },
    /// Items listed by the nearest farmer.
    Proximity {
        seller: RankedResult<Seller>,
        items: Vec<Offering>,
    },
}

impl Recommendation {
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        match self {
            Self::History { .. } => Strategy::History,
            Self::Proximity { .. } => Strategy::Proximity,
        }
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        match self {
            Self::History { items } => items.len(),
            Self::Proximity { items, .. } => items.len(),
        }
    }
}

/// Pick a strategy for `consumer` and run it.
///
/// # Errors
///
/// - [`CoreError::InvalidInput`] when the proximity branch is taken and the
///   consumer has no resolvable location.
/// - [`CoreError::NoResolvableSeller`] when no farmer can be located.
pub fn recommend(
    consumer: &ConsumerProfile,
    inputs: &RecommendationInputs<'_>,
) -> Result<Recommendation, CoreError> {
    let strategy = Strategy::select(consumer, inputs.history);
    tracing::info!(
        consumer_id = consumer.id,
        login_count = consumer.login_count,
        ?strategy,
        "selected recommendation strategy"
    );

    match strategy {
        Strategy::History => Ok(Recommendation::History {
            items: most_purchased(consumer, inputs.history, inputs.limit),
        }),
        Strategy::Proximity => nearest_seller_items(consumer, inputs),
    }
}

/// Item ids ordered by purchase count descending, lower id first on ties.
fn most_purchased(
    consumer: &ConsumerProfile,
    history: &[PurchaseHistoryEntry],
    limit: usize,
) -> Vec<i64> {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for entry in purchases_of(consumer, history) {
        *counts.entry(entry.item_id).or_default() += 1;
    }

    let mut ranked: Vec<(i64, usize)> = counts.into_iter().collect();
    ranked.sort_by(|(a_id, a_count), (b_id, b_count)| {
        b_count.cmp(a_count).then_with(|| a_id.cmp(b_id))
    });
    ranked.into_iter().take(limit).map(|(id, _)| id).collect()
}

fn nearest_seller_items(
    consumer: &ConsumerProfile,
    inputs: &RecommendationInputs<'_>,
) -> Result<Recommendation, CoreError> {
    let origin = consumer.resolve_coordinate(inputs.locations).ok_or_else(|| {
        CoreError::invalid(format!(
            "consumer {} has no coordinate or resolvable location",
            consumer.id
        ))
    })?;

    let seller = rank_by_distance(
        &origin,
        inputs.sellers.iter().cloned(),
        None,
        inputs.locations,
    )?
    .into_iter()
    .next()
    .filter(RankedResult::is_known)
    .ok_or(CoreError::NoResolvableSeller)?;

    let items = inputs
        .offerings
        .iter()
        .filter(|offering| offering.seller_id == seller.entity.id)
        .cloned()
        .collect();

    Ok(Recommendation::Proximity { seller, items })
}

fn purchases_of<'a>(
    consumer: &'a ConsumerProfile,
    history: &'a [PurchaseHistoryEntry],
) -> impl Iterator<Item = &'a PurchaseHistoryEntry> + 'a {
    history
        .iter()
        .filter(move |entry| entry.consumer_id == consumer.id)
}
