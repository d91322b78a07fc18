mod consumers;
mod farmer_items;
mod farmers;
mod locations;
mod rank;

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use kisanlink_core::{Coordinate, CoreError, NamedLocationTable};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub locations: Arc<NamedLocationTable>,
    pub recommend_limit: usize,
    pub nearby_radius_km: f64,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" | "no_resolvable_seller" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_db_error(request_id: String, error: &kisanlink_db::DbError) -> ApiError {
    if matches!(error, kisanlink_db::DbError::NotFound) {
        return ApiError::new(request_id, "not_found", "record not found");
    }
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

pub(super) fn map_core_error(request_id: String, error: &CoreError) -> ApiError {
    let code = match error {
        CoreError::InvalidInput(_) => "validation_error",
        CoreError::UnknownConsumer(_) => "not_found",
        CoreError::NoResolvableSeller => "no_resolvable_seller",
    };
    ApiError::new(request_id, code, error.to_string())
}

/// Turn a rejected JSON body into the error envelope.
///
/// Values that parse but fail validation (an out-of-range coordinate, say)
/// are `validation_error`; malformed JSON or a wrong content type is
/// `bad_request`. Both are 400.
pub(super) fn map_json_rejection(request_id: String, rejection: &JsonRejection) -> ApiError {
    let code = match rejection {
        JsonRejection::JsonDataError(_) => "validation_error",
        _ => "bad_request",
    };
    ApiError::new(request_id, code, rejection.body_text())
}

/// Build an origin from optional `lat`/`lon` query parameters.
///
/// Both absent is `Ok(None)`; one without the other or an out-of-range value
/// is a validation error.
pub(super) fn parse_origin(
    request_id: &str,
    lat: Option<f64>,
    lon: Option<f64>,
) -> Result<Option<Coordinate>, ApiError> {
    if lat.is_some() != lon.is_some() {
        return Err(ApiError::new(
            request_id,
            "validation_error",
            "lat and lon must be provided together",
        ));
    }
    Coordinate::from_parts(lat, lon).map_err(|e| map_core_error(request_id.to_owned(), &e))
}

/// Reject a cutoff the ranker would refuse, before any database work.
pub(super) fn validate_cutoff(
    request_id: &str,
    max_distance_km: Option<f64>,
) -> Result<(), ApiError> {
    match max_distance_km {
        Some(cutoff) if !cutoff.is_finite() || cutoff < 0.0 => Err(ApiError::new(
            request_id,
            "validation_error",
            format!("max_distance_km must be a non-negative number, got {cutoff}"),
        )),
        _ => Ok(()),
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/locations", get(locations::list_locations))
        .route("/api/v1/rank", post(rank::rank_entities))
        .route("/api/v1/farmers/nearby", get(farmers::list_nearby_farmers))
        .route("/api/v1/farmer-items", get(farmer_items::list_farmer_items))
        .route(
            "/api/v1/consumers/{consumer_id}/customer-type",
            get(consumers::get_customer_type),
        )
        .route(
            "/api/v1/consumers/{consumer_id}/recommendations",
            get(consumers::get_recommendations),
        )
        .route(
            "/api/v1/consumers/{consumer_id}/logins",
            post(consumers::record_login),
        )
        .route(
            "/api/v1/consumers/{consumer_id}/purchases",
            post(consumers::record_purchase),
        )
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match kisanlink_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
