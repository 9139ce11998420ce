//! HTTP endpoint Prometheus scrapes.

use super::render;
use crate::Result;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use core::net::SocketAddr;
use ohno::IntoAppError;
use prometheus::Registry;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

const TEXT_FORMAT: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Routes served by the exporter: `/metrics` and `/health`.
pub fn router(registry: Registry) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(registry)
}

/// Bind `addr` and serve the exposition routes on a background task.
///
/// Returns the address actually bound, which differs from `addr` when port 0 was requested.
pub async fn serve(registry: Registry, addr: SocketAddr) -> Result<(SocketAddr, JoinHandle<()>)> {
    let listener = TcpListener::bind(addr)
        .await
        .into_app_err_with(|| format!("binding metrics endpoint to {addr}"))?;
    let local = listener
        .local_addr()
        .into_app_err("reading the metrics endpoint address")?;

    log::info!("serving metrics on http://{local}/metrics");

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router(registry)).await {
            log::error!("metrics endpoint stopped: {e}");
        }
    });

    Ok((local, handle))
}

async fn metrics_handler(State(registry): State<Registry>) -> Response {
    match render(&registry) {
        Ok(text) => (StatusCode::OK, [(CONTENT_TYPE, TEXT_FORMAT)], text).into_response(),
        Err(e) => {
            log::error!("could not encode metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to encode metrics").into_response()
        }
    }
}

async fn health_handler() -> &'static str {
    "ok"
}
