//! Consumer-facing handlers.
//!
//! - `GET  /api/v1/consumers/{id}/customer-type`   new vs returning
//! - `GET  /api/v1/consumers/{id}/recommendations` history or nearest-farmer items
//! - `POST /api/v1/consumers/{id}/logins`          bump the login counter
//! - `POST /api/v1/consumers/{id}/purchases`       append to purchase history

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use kisanlink_core::{
    classify, recommend, ConsumerProfile, CoreError, CustomerKind, Offering,
    PurchaseHistoryEntry, Recommendation, RecommendationInputs, Seller, Strategy,
};
use kisanlink_db::DbError;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{
    map_core_error, map_db_error, map_json_rejection, ApiError, ApiResponse, AppState,
    ResponseMeta,
};

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub(super) struct CustomerTypeResponse {
    pub consumer_id: i64,
    pub customer_type: CustomerKind,
    pub login_count: u32,
    pub purchase_count: usize,
}

#[derive(Debug, Serialize)]
pub(super) struct RecommendationResponse {
    pub consumer_id: i64,
    #[serde(flatten)]
    pub recommendation: Recommendation,
}

#[derive(Debug, Serialize)]
pub(super) struct LoginResponse {
    pub consumer_id: i64,
    pub login_count: i32,
}

#[derive(Debug, Deserialize)]
pub(super) struct PurchaseRequest {
    pub item_id: i64,
}

#[derive(Debug, Serialize)]
pub(super) struct PurchaseResponse {
    pub id: i64,
    pub consumer_id: i64,
    pub item_id: i64,
    pub purchased_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Loaders
// ---------------------------------------------------------------------------

fn map_consumer_lookup_error(request_id: &str, consumer_id: i64, error: &DbError) -> ApiError {
    match error {
        DbError::NotFound => map_core_error(
            request_id.to_owned(),
            &CoreError::UnknownConsumer(consumer_id),
        ),
        other => map_db_error(request_id.to_owned(), other),
    }
}

async fn load_consumer(
    state: &AppState,
    consumer_id: i64,
    request_id: &str,
) -> Result<(ConsumerProfile, Vec<PurchaseHistoryEntry>), ApiError> {
    let (consumer, history) = tokio::try_join!(
        kisanlink_db::get_consumer(&state.pool, consumer_id),
        kisanlink_db::list_purchase_history(&state.pool, consumer_id),
    )
    .map_err(|e| map_consumer_lookup_error(request_id, consumer_id, &e))?;

    Ok((
        consumer.into(),
        history.into_iter().map(PurchaseHistoryEntry::from).collect(),
    ))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub(super) async fn get_customer_type(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(consumer_id): Path<i64>,
) -> Result<Json<ApiResponse<CustomerTypeResponse>>, ApiError> {
    let (consumer, history) = load_consumer(&state, consumer_id, &req_id.0).await?;

    Ok(Json(ApiResponse {
        data: CustomerTypeResponse {
            consumer_id,
            customer_type: classify(&consumer, &history),
            login_count: consumer.login_count,
            purchase_count: history.len(),
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_recommendations(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(consumer_id): Path<i64>,
) -> Result<Json<ApiResponse<RecommendationResponse>>, ApiError> {
    let (consumer, history) = load_consumer(&state, consumer_id, &req_id.0).await?;

    // The catalog is only needed when the proximity strategy will run.
    let (sellers, offerings): (Vec<Seller>, Vec<Offering>) =
        match Strategy::select(&consumer, &history) {
            Strategy::History => (Vec::new(), Vec::new()),
            Strategy::Proximity => {
                let (farmers, items) = tokio::try_join!(
                    kisanlink_db::list_farmers(&state.pool),
                    kisanlink_db::list_farmer_items(&state.pool, None),
                )
                .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
                (
                    farmers.into_iter().map(Seller::from).collect(),
                    items.into_iter().map(Offering::from).collect(),
                )
            }
        };

    let recommendation = recommend(
        &consumer,
        &RecommendationInputs {
            history: &history,
            sellers: &sellers,
            offerings: &offerings,
            locations: &state.locations,
            limit: state.recommend_limit,
        },
    )
    .map_err(|e| map_core_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: RecommendationResponse {
            consumer_id,
            recommendation,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn record_login(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(consumer_id): Path<i64>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let login_count = kisanlink_db::record_consumer_login(&state.pool, consumer_id)
        .await
        .map_err(|e| map_consumer_lookup_error(&req_id.0, consumer_id, &e))?;

    tracing::info!(consumer_id, login_count, "recorded consumer login");

    Ok(Json(ApiResponse {
        data: LoginResponse {
            consumer_id,
            login_count,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn record_purchase(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(consumer_id): Path<i64>,
    body: Result<Json<PurchaseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<PurchaseResponse>>), ApiError> {
    let Json(body) = body.map_err(|e| map_json_rejection(req_id.0.clone(), &e))?;
    let row = kisanlink_db::record_purchase(&state.pool, consumer_id, body.item_id)
        .await
        .map_err(|e| match e {
            DbError::NotFound => ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!(
                    "consumer {consumer_id} or item {} not found",
                    body.item_id
                ),
            ),
            other => map_db_error(req_id.0.clone(), &other),
        })?;

    tracing::info!(consumer_id, item_id = row.item_id, "recorded purchase");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: PurchaseResponse {
                id: row.id,
                consumer_id: row.consumer_id,
                item_id: row.item_id,
                purchased_at: row.purchased_at,
            },
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}
