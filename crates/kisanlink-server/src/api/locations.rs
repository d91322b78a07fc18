use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct LocationItem {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// The named location table, in the order it was configured.
pub(super) async fn list_locations(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<LocationItem>>> {
    let data = state
        .locations
        .entries()
        .map(|location| LocationItem {
            name: location.name.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
        })
        .collect();

    Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    })
}
