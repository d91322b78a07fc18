use axum::{
    extract::{Query, State},
    Extension, Json,
};
use kisanlink_core::{rank_by_distance, Offering, RankedResult};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{
    map_core_error, map_db_error, parse_origin, validate_cutoff, ApiError, ApiResponse, AppState,
    ResponseMeta,
};

#[derive(Debug, Deserialize)]
pub(super) struct FarmerItemsQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub max_distance_km: Option<f64>,
    pub farmer_id: Option<i64>,
}

/// Farmer items, distance ranked when an origin is given, otherwise in id
/// order with unknown distances.
pub(super) async fn list_farmer_items(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<FarmerItemsQuery>,
) -> Result<Json<ApiResponse<Vec<RankedResult<Offering>>>>, ApiError> {
    let origin = parse_origin(&req_id.0, query.lat, query.lon)?;
    validate_cutoff(&req_id.0, query.max_distance_km)?;
    if origin.is_none() && query.max_distance_km.is_some() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "max_distance_km requires lat and lon",
        ));
    }

    let offerings = kisanlink_db::list_farmer_items(&state.pool, query.farmer_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .into_iter()
        .map(Offering::from);

    let data = match origin {
        Some(origin) => {
            rank_by_distance(&origin, offerings, query.max_distance_km, &state.locations)
                .map_err(|e| map_core_error(req_id.0.clone(), &e))?
        }
        None => offerings
            .map(|entity| RankedResult {
                entity,
                distance_km: None,
            })
            .collect(),
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
