use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    dispatch::Dispatcher,
    error::DispatchError,
    models::{request::NotificationRequest, response::ApiResponse},
};

pub struct AppState {
    pub dispatcher: Dispatcher,
}

/// Gateway router, factored out of the server loop so tests can drive it
/// without binding a socket.
pub fn gateway_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/notifications", post(dispatch_notification))
        .route("/api/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_gateway(
    state: Arc<AppState>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = gateway_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Gateway listening");

    axum::serve(listener, app).await?;

    Ok(())
}

async fn dispatch_notification(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NotificationRequest>,
) -> Result<impl IntoResponse, DispatchError> {
    let envelopes = state.dispatcher.dispatch(request).await?;

    Ok(Json(ApiResponse::success(
        envelopes,
        "notification queued".to_string(),
    )))
}

async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Liveness-only server each worker runs beside its consume loop.
pub async fn run_health_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = Router::new().route("/health", get(health_check));

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Health server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
