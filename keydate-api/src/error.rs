use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use keydate_catalog::{InventoryError, PricingError};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFoundError(String),
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl AppError {
    pub fn from_pricing(err: PricingError) -> Self {
        match err {
            PricingError::PriceOverflow => AppError::InternalServerError(err.to_string()),
            _ => AppError::ValidationError(err.to_string()),
        }
    }

    pub fn from_inventory(err: InventoryError) -> Self {
        match err {
            InventoryError::NotFound(_) => AppError::NotFoundError(err.to_string()),
            InventoryError::InvalidPrice(_) => AppError::ValidationError(err.to_string()),
            InventoryError::Backend(_) => AppError::InternalServerError(err.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            },
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            },
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}
