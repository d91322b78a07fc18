use axum::{
    extract::{Query, State},
    Extension, Json,
};
use kisanlink_core::{nearby, RankedResult, Seller};
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{
    map_core_error, map_db_error, parse_origin, validate_cutoff, ApiError, ApiResponse, AppState,
    ResponseMeta,
};

#[derive(Debug, Deserialize)]
pub(super) struct NearbyQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub max_distance_km: Option<f64>,
}

/// Farmers within `max_distance_km` (default from config) of `lat`/`lon`,
/// nearest first. Farmers that cannot be located are left out.
pub(super) async fn list_nearby_farmers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<ApiResponse<Vec<RankedResult<Seller>>>>, ApiError> {
    let origin = parse_origin(&req_id.0, query.lat, query.lon)?.ok_or_else(|| {
        ApiError::new(
            req_id.0.clone(),
            "validation_error",
            "lat and lon are required",
        )
    })?;
    let radius = query.max_distance_km.unwrap_or(state.nearby_radius_km);
    validate_cutoff(&req_id.0, Some(radius))?;

    let sellers = kisanlink_db::list_farmers(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .into_iter()
        .map(Seller::from);

    let data = nearby(&origin, sellers, radius, &state.locations)
        .map_err(|e| map_core_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
