use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use cname_finalizer_infrastructure::dns::FinalizeMetrics;
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

pub async fn start_web_server(
    bind_addr: SocketAddr,
    metrics: FinalizeMetrics,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    info!(
        bind_address = %bind_addr,
        metrics_url = format!("http://{}/metrics", bind_addr),
        "Starting metrics server"
    );

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    axum::serve(listener, create_app(metrics))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("Metrics server stopped");
    Ok(())
}

fn create_app(metrics: FinalizeMetrics) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(metrics)
}

async fn metrics_handler(
    State(metrics): State<FinalizeMetrics>,
) -> Result<impl IntoResponse, StatusCode> {
    let body = metrics.render_prometheus().map_err(|e| {
        error!(error = %e, "Failed to encode metrics");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok(([(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body))
}

async fn health_handler() -> &'static str {
    "OK"
}
