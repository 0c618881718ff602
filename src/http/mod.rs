use std::{io, net::SocketAddr, sync::Arc};

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use prometheus::{Registry, TextEncoder};
use tokio::{net::TcpListener, time::Duration};
use tokio_util::sync::CancellationToken;
use tower_http::timeout::TimeoutLayer;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const ROOT_BODY: &str = concat!(
    env!("CARGO_PKG_NAME"),
    " ",
    env!("CARGO_PKG_VERSION"),
    "\n\nMetrics are exposed at '/metrics'.\n"
);

#[derive(Clone)]
struct HttpServiceState {
    metrics: Arc<Registry>,
}

fn router(metrics: Arc<Registry>) -> Router {
    // Assemble the HTTP Service State object, that will be passed to the routes
    let state = HttpServiceState {
        metrics,
    };

    Router::new()
        // `GET /` goes to `root`
        .route("/", get(root))
        .route("/metrics", get(prometheus_metrics))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .with_state(state)
}

/// Serve the metrics over HTTP, until the given [`CancellationToken`] is cancelled.
///
/// Fails only if it's not possible to listen on the given address.
pub async fn init(
    listen_on: SocketAddr,
    metrics: Arc<Registry>,
    shutdown_token: CancellationToken,
) -> io::Result<()> {
    let listener = TcpListener::bind(listen_on).await?;

    info!("Begin listening on '{}'...", listen_on);
    axum::serve(listener, router(metrics))
        .with_graceful_shutdown(async move { shutdown_token.cancelled().await })
        .await
}

async fn root() -> &'static str {
    ROOT_BODY
}

async fn prometheus_metrics(State(state): State<HttpServiceState>) -> impl IntoResponse {
    let mut status = StatusCode::OK;
    let mut headers = HeaderMap::new();

    // As defined by Prometheus: https://github.com/prometheus/docs/blob/main/content/docs/instrumenting/exposition_formats.md#basic-info
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; version=0.0.4"));

    let mut body = String::new();
    let metrics_family = state.metrics.gather();
    if let Err(e) = TextEncoder.encode_utf8(&metrics_family, &mut body) {
        status = StatusCode::INTERNAL_SERVER_ERROR;
        body = format!("Failed to encode metrics: {e}");
    }

    (status, headers, body)
}
