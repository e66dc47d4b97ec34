use super::AppState;
use crate::application::initiator::{PaymentRequest, PaymentUrl};
use crate::error::PaymentError;
use axum::{
    Json,
    body::to_bytes,
    extract::{ConnectInfo, RawQuery, Request, State},
    http::{HeaderMap, StatusCode, header::LOCATION},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use std::net::{IpAddr, SocketAddr};
use tracing::{debug, warn};
use url::form_urlencoded;

const MAX_BODY_BYTES: usize = 16 * 1024;

/// `POST /payments`: returns a signed URL to the provider's checkout page.
pub async fn create_payment_handler(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<PaymentUrl>, PaymentError> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let client_ip = forwarded_ip(request.headers()).or(peer);

    let body = to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|_| PaymentError::InvalidRequest("Malformed payload".to_string()))?;
    let payload: PaymentRequest = serde_json::from_slice(&body).map_err(|e| {
        debug!(error = %e, "Rejected checkout payload");
        PaymentError::InvalidRequest("Malformed payload".to_string())
    })?;

    let url = state
        .initiator
        .create_payment_url(&payload, client_ip, Utc::now())?;
    Ok(Json(url))
}

/// `GET /payments/return`: the provider's browser redirect after payment.
///
/// Always answers `302 Found` to the result page unless the gateway itself is
/// misconfigured.
pub async fn payment_return_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Response {
    let pairs: Vec<(String, String)> = form_urlencoded::parse(query.unwrap_or_default().as_bytes())
        .into_owned()
        .collect();

    match state.verifier.handle(pairs).await {
        Ok(outcome) => {
            debug!(verdict = ?outcome.verdict, "Redirecting to payment result page");
            (StatusCode::FOUND, [(LOCATION, outcome.redirect_url)]).into_response()
        }
        Err(e) => e.into_response(),
    }
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let value = headers.get("x-forwarded-for")?.to_str().ok()?;
    let first = value.split(',').next()?.trim();
    first
        .parse()
        .map_err(|_| warn!(value = first, "Ignoring unparseable X-Forwarded-For"))
        .ok()
}
