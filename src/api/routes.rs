use crate::api::api_error::APIError;
use crate::api::model::RecordValue;
use crate::api::server::AppState;
use crate::error::Error;
use crate::store::{Domain, RecordType};
use crate::zone;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::WithRejection;
use serde_json::json;
use std::str::FromStr;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub(super) fn new(state: AppState) -> Router {
    Router::new()
        .route("/healthcheck", get(health_check))
        .route(
            "/domains/:domain/record/:type",
            get(get_record).put(put_record).delete(delete_record),
        )
        .route("/zone", post(import_zone))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.config.api_timeout))
        .with_state(state)
}

fn record_key(domain: &str, record_type: &str) -> Result<(Domain, RecordType), Error> {
    Ok((Domain::new(domain), RecordType::from_str(record_type)?))
}

#[allow(clippy::unused_async)]
async fn health_check() -> impl IntoResponse {
    Json(json!({"ok":"healthy"}))
}

async fn get_record(
    State(state): State<AppState>,
    Path((domain, record_type)): Path<(String, String)>,
) -> Result<Json<RecordValue>, APIError> {
    let (domain, record_type) = record_key(&domain, &record_type)?;
    match state.store.get(&domain, record_type).await? {
        Some(value) => Ok(Json(RecordValue { value })),
        None => Err(Error::RecordNotFound(domain, record_type).into()),
    }
}

async fn put_record(
    State(state): State<AppState>,
    Path((domain, record_type)): Path<(String, String)>,
    WithRejection(Json(payload), _): WithRejection<Json<RecordValue>, APIError>,
) -> Result<StatusCode, APIError> {
    let (domain, record_type) = record_key(&domain, &record_type)?;
    state.store.set(&domain, record_type, payload.value).await?;
    tracing::info!("set {record_type} record for \"{domain}\"");
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_record(
    State(state): State<AppState>,
    Path((domain, record_type)): Path<(String, String)>,
    WithRejection(Json(payload), _): WithRejection<Json<RecordValue>, APIError>,
) -> Result<StatusCode, APIError> {
    let (domain, record_type) = record_key(&domain, &record_type)?;
    state
        .store
        .conditional_delete(&domain, record_type, &payload.value)
        .await?;
    tracing::info!("deleted {record_type} record for \"{domain}\"");
    Ok(StatusCode::NO_CONTENT)
}

async fn import_zone(
    State(state): State<AppState>,
    body: String,
) -> Result<StatusCode, APIError> {
    let summary = zone::import(&state.store, &body).await?;
    tracing::info!(
        "imported zone: {} records stored, {} failed",
        summary.applied,
        summary.failed
    );
    if summary.failed > 0 {
        return Err(anyhow::anyhow!(
            "failed to store {} of {} zone records",
            summary.failed,
            summary.applied + summary.failed
        )
        .into());
    }
    Ok(StatusCode::NO_CONTENT)
}
