//! `POST /api/v1/rank`: rank caller-supplied farmers and items around an
//! origin without touching the database.

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};
use kisanlink_core::{rank_by_distance, Coordinate, Offering, RankedResult, Seller};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_core_error, map_json_rejection, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct RankRequest {
    pub origin: Coordinate,
    pub max_distance_km: Option<f64>,
    #[serde(default)]
    pub sellers: Vec<Seller>,
    #[serde(default)]
    pub offerings: Vec<Offering>,
}

#[derive(Debug, Serialize)]
pub(super) struct RankResponse {
    pub sellers: Vec<RankedResult<Seller>>,
    pub offerings: Vec<RankedResult<Offering>>,
}

pub(super) async fn rank_entities(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Result<Json<RankRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<RankResponse>>, ApiError> {
    // Coordinates are validated while deserializing, so a bad origin or
    // entity coordinate surfaces here as a rejection.
    let Json(body) = body.map_err(|e| map_json_rejection(req_id.0.clone(), &e))?;
    let sellers = rank_by_distance(
        &body.origin,
        body.sellers,
        body.max_distance_km,
        &state.locations,
    )
    .map_err(|e| map_core_error(req_id.0.clone(), &e))?;
    let offerings = rank_by_distance(
        &body.origin,
        body.offerings,
        body.max_distance_km,
        &state.locations,
    )
    .map_err(|e| map_core_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: RankResponse { sellers, offerings },
        meta: ResponseMeta::new(req_id.0),
    }))
}
