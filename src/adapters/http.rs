//! HTTP boundary: decodes requests, runs one service operation per request
//! and maps `UomError` categories onto status codes.

use crate::core::uom_service::UomService;
use crate::core::UomRepository;
use crate::domain::model::BaseUom;
use crate::utils::error::{ErrorCategory, Result, UomError};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

pub struct AppState<R: UomRepository> {
    pub service: UomService<R>,
    pub request_timeout: Duration,
}

pub struct ApiError(UomError);

impl From<UomError> for ApiError {
    fn from(err: UomError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn bad_request(message: String) -> Self {
        Self(UomError::Decode { message })
    }
}

pub fn status_for(category: ErrorCategory) -> StatusCode {
    match category {
        ErrorCategory::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorCategory::NotFound => StatusCode::NOT_FOUND,
        ErrorCategory::Conflict => StatusCode::CONFLICT,
        ErrorCategory::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.category());
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }

        let body = match self.0.validation_errors() {
            Some(errors) => json!({ "error": self.0.to_string(), "fields": errors }),
            // backend details stay in the log
            None if status == StatusCode::INTERNAL_SERVER_ERROR => {
                json!({ "error": "internal error" })
            }
            None => json!({ "error": self.0.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

/// Dropping the service future on expiry cancels any outstanding store call.
async fn bounded<T>(timeout: Duration, operation: impl Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(UomError::Canceled),
    }
}

fn decode_body(
    payload: std::result::Result<Json<BaseUom>, JsonRejection>,
) -> std::result::Result<BaseUom, ApiError> {
    match payload {
        Ok(Json(base)) => Ok(base),
        Err(rejection) => {
            tracing::warn!("Invalid JSON body: {}", rejection.body_text());
            Err(ApiError::bad_request(format!(
                "Invalid JSON: {}",
                rejection.body_text()
            )))
        }
    }
}

pub fn router<R: UomRepository + 'static>(state: Arc<AppState<R>>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/uom", get(list_handler::<R>).post(create_handler::<R>))
        .route(
            "/uom/{id}",
            get(get_handler::<R>)
                .put(update_handler::<R>)
                .delete(delete_handler::<R>),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn create_handler<R: UomRepository>(
    State(state): State<Arc<AppState<R>>>,
    payload: std::result::Result<Json<BaseUom>, JsonRejection>,
) -> std::result::Result<Response, ApiError> {
    let base = decode_body(payload)?;
    let uom = bounded(state.request_timeout, state.service.create_uom(base)).await?;
    Ok((StatusCode::CREATED, Json(uom)).into_response())
}

async fn list_handler<R: UomRepository>(
    State(state): State<Arc<AppState<R>>>,
) -> std::result::Result<Response, ApiError> {
    let uoms = bounded(state.request_timeout, state.service.get_all_uoms()).await?;
    Ok(Json(uoms).into_response())
}

async fn get_handler<R: UomRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> std::result::Result<Response, ApiError> {
    let uom = bounded(state.request_timeout, state.service.get_uom_by_id(&id)).await?;
    Ok(Json(uom).into_response())
}

async fn update_handler<R: UomRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<BaseUom>, JsonRejection>,
) -> std::result::Result<Response, ApiError> {
    let base = decode_body(payload)?;
    let uom = bounded(state.request_timeout, state.service.update_uom(&id, base)).await?;
    Ok(Json(uom).into_response())
}

async fn delete_handler<R: UomRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> std::result::Result<Response, ApiError> {
    bounded(state.request_timeout, state.service.delete_uom(&id)).await?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
