//! Thin axum adapter over the two payment handlers.

use crate::application::callback::CallbackVerifier;
use crate::application::initiator::PaymentInitiator;
use axum::{
    Router,
    http::{
        HeaderName, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{get, post},
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub mod error;
pub mod routes;

use routes::{create_payment_handler, payment_return_handler};

#[derive(Clone)]
pub struct AppState {
    pub initiator: Arc<PaymentInitiator>,
    pub verifier: Arc<CallbackVerifier>,
}

impl AppState {
    pub fn new(initiator: PaymentInitiator, verifier: CallbackVerifier) -> Self {
        Self {
            initiator: Arc::new(initiator),
            verifier: Arc::new(verifier),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/payments", post(create_payment_handler))
        .route("/payments/return", get(payment_return_handler))
        .layer(cors)
        .with_state(state)
}

pub async fn serve(state: AppState, port: u16) -> std::io::Result<()> {
    let address = format!("0.0.0.0:{port}");
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
