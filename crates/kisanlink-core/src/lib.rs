//! Domain core for the Kisanlink marketplace: geographic ranking of farmers
//! and their items, and the consumer recommendation selector.
//!
//! Everything in this crate is synchronous and free of I/O apart from the
//! config loaders. Callers fetch rows, convert them into the types here, and
//! serialize the results.

pub mod app_config;
pub mod config;
pub mod error;
pub mod geo;
pub mod locations;
pub mod ranking;
pub mod recommend;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, CoreError};
pub use geo::{haversine_km, round_km, Coordinate, EARTH_RADIUS_KM};
pub use locations::{
    load_locations, shadowed_entries, LocationsFile, NamedLocation, NamedLocationTable,
};
pub use ranking::{nearby, rank_by_distance, LocatedEntity, Offering, RankedResult, Seller};
pub use recommend::{
    classify, recommend, ConsumerProfile, CustomerKind, PurchaseHistoryEntry, Recommendation,
    RecommendationInputs, Strategy, DEFAULT_RECOMMEND_LIMIT,
};
