use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Filings API error: {0}")]
    Api(#[from] filings_client::error::ApiError),
    #[error("Statement error: {0}")]
    CommonSize(#[from] common_size::CommonSizeError),
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Api(filings_client::error::ApiError::UnknownTicker(ticker)) => (
                StatusCode::NOT_FOUND,
                format!("Unknown ticker symbol '{ticker}'"),
            ),
            AppError::Api(api_err) => {
                tracing::error!(error = ?api_err, "Filings API error.");
                (
                    StatusCode::BAD_GATEWAY,
                    "The upstream filings API request failed".to_string(),
                )
            }
            AppError::CommonSize(cs_err) => (StatusCode::UNPROCESSABLE_ENTITY, cs_err.to_string()),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
