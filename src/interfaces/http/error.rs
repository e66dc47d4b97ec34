use crate::error::PaymentError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            PaymentError::InvalidRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            PaymentError::Configuration(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Payment provider not configured".to_string(),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
            ),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
