//! HTTP route definitions

use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use bytes::Bytes;
use serde::Serialize;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, warn};

use crate::app::AppState;
use crate::catalog::{self, DecodeError};
use crate::http::middleware::log_request;
use crate::store::{PgEntity, ResourceStore, StoreError};

/// Requests running longer than this are answered with 408
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.client_origins);

    let mut router = Router::new()
        .route("/health", get(health_handler))
        .merge(resource_routes("/api/products", state.products.clone()))
        .merge(resource_routes("/api/categories", state.categories.clone()))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    if state.config.log_requests {
        router = router.layer(middleware::from_fn(log_request));
    }

    router
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|s| match s.parse::<HeaderValue>() {
            Ok(origin) => Some(origin),
            Err(_) => {
                warn!(origin = %s, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Collection and item routes for one resource.
///
/// An empty or multi-segment id under the collection is rejected as an
/// invalid id. Methods not listed here are answered with 405 by the method
/// router.
fn resource_routes<E: PgEntity>(collection: &str, store: ResourceStore<E>) -> Router {
    let invalid_id = get(invalid_id_handler::<E>)
        .put(invalid_id_handler::<E>)
        .delete(invalid_id_handler::<E>);

    Router::new()
        .route(collection, get(list_handler::<E>).post(create_handler::<E>))
        .route(
            &format!("{collection}/:id"),
            get(get_handler::<E>)
                .put(replace_handler::<E>)
                .delete(delete_handler::<E>),
        )
        .route(&format!("{collection}/"), invalid_id.clone())
        .route(&format!("{collection}/:id/*rest"), invalid_id)
        .with_state(store)
}

// ============================================================================
// Health endpoint
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Server is running",
    })
}

// ============================================================================
// Resource endpoints
// ============================================================================

fn invalid_id<E: PgEntity>() -> AppError {
    AppError::BadRequest(format!("Invalid {} ID", E::KIND))
}

/// Parse the `{id}` path segment as a base-10 integer
fn parse_id<E: PgEntity>(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>().map_err(|_| invalid_id::<E>())
}

async fn invalid_id_handler<E: PgEntity>() -> AppError {
    invalid_id::<E>()
}

async fn list_handler<E: PgEntity>(
    State(store): State<ResourceStore<E>>,
) -> Result<Json<Vec<E>>, AppError> {
    Ok(Json(store.list().await?))
}

async fn create_handler<E: PgEntity>(
    State(store): State<ResourceStore<E>>,
    body: Bytes,
) -> Result<Json<E>, AppError> {
    let payload = catalog::decode::<E::Payload>(&body)?;
    Ok(Json(store.create(payload).await?))
}

async fn get_handler<E: PgEntity>(
    State(store): State<ResourceStore<E>>,
    Path(raw_id): Path<String>,
) -> Result<Json<E>, AppError> {
    let id = parse_id::<E>(&raw_id)?;
    Ok(Json(store.get(id).await?))
}

async fn replace_handler<E: PgEntity>(
    State(store): State<ResourceStore<E>>,
    Path(raw_id): Path<String>,
    body: Bytes,
) -> Result<Json<E>, AppError> {
    let id = parse_id::<E>(&raw_id)?;
    // Decode before touching the store so a bad body never clobbers the entry
    let payload = catalog::decode::<E::Payload>(&body)?;
    Ok(Json(store.replace(id, payload).await?))
}

#[derive(Serialize)]
struct DeleteResponse {
    status: &'static str,
    message: String,
}

async fn delete_handler<E: PgEntity>(
    State(store): State<ResourceStore<E>>,
    Path(raw_id): Path<String>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = parse_id::<E>(&raw_id)?;
    store.delete(id).await?;

    Ok(Json(DeleteResponse {
        status: "success",
        message: format!("{} deleted successfully", E::KIND),
    }))
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DecodeError> for AppError {
    fn from(err: DecodeError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => AppError::NotFound(err.to_string()),
            StoreError::Database(e) => {
                error!("Database error: {}", e);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match &self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}
