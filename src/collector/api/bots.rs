use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::collector::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::collector::server::AppState;
use crate::telemetry::{UnitRecord, UnitUpdate};

#[derive(Debug, Serialize, ToSchema)]
pub struct StatusResponse {
    pub message: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BotQuery {
    pub mac: String,
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service is up", body = StatusResponse)
    ),
    tag = "bots"
)]
pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        message: "Active".to_string(),
    })
}

#[utoipa::path(
    post,
    path = "/bot/update",
    request_body = UnitUpdate,
    responses(
        (status = 200, description = "Record after the update", body = UnitRecord),
        (status = 400, description = "Invalid unit identifier", body = ErrorResponse),
        (status = 500, description = "Store rejected the write", body = ErrorResponse)
    ),
    tag = "bots"
)]
pub async fn update_bot(
    State(state): State<AppState>,
    Json(update): Json<UnitUpdate>,
) -> ApiResult<Json<UnitRecord>> {
    let record = state.engine.upsert(&update).await?;
    Ok(Json(record))
}

#[utoipa::path(
    get,
    path = "/bot/get",
    request_body = BotQuery,
    responses(
        (status = 200, description = "Stored record", body = UnitRecord),
        (status = 404, description = "Unknown unit", body = ErrorResponse)
    ),
    tag = "bots"
)]
pub async fn get_bot(
    State(state): State<AppState>,
    Json(query): Json<BotQuery>,
) -> ApiResult<Json<UnitRecord>> {
    state
        .store
        .fetch(&query.mac)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Bot with MAC {} not found", query.mac)))
}

#[utoipa::path(
    get,
    path = "/bot/list",
    responses(
        (status = 200, description = "Every stored record, ordered by MAC", body = Vec<UnitRecord>)
    ),
    tag = "bots"
)]
pub async fn list_bots(State(state): State<AppState>) -> ApiResult<Json<Vec<UnitRecord>>> {
    Ok(Json(state.store.list().await?))
}
