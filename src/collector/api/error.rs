use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::collector::engine::UpsertError;
use crate::collector::store::StoreError;

pub enum ApiError {
    Validation(String),
    NotFound(String),
    WriteFailed(String),
    Storage(StoreError),
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Storage(e)
    }
}

impl From<UpsertError> for ApiError {
    fn from(e: UpsertError) -> Self {
        match e {
            UpsertError::InvalidUnitId => ApiError::Validation(e.to_string()),
            UpsertError::CreateFailed(_) | UpsertError::UpdateFailed(_) => {
                ApiError::WriteFailed(e.to_string())
            }
            UpsertError::Store(e) => ApiError::Storage(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("validation_failed", &msg),
            ),
            ApiError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("bot_not_found", &msg),
            ),
            ApiError::WriteFailed(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("write_failed", &msg),
            ),
            ApiError::Storage(e) => {
                log::error!("Store failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("storage_error", &e.to_string()),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(error: &str, detail: &str) -> Self {
        ErrorResponse {
            error: error.to_string(),
            detail: detail.to_string(),
        }
    }
}
