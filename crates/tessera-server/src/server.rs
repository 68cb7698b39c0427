use std::net::SocketAddr;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::error::{error_envelope, not_found};
use crate::handlers::{
    config::{get_config, get_config_with_label},
    health::{health_check, repository_status},
    metrics::metrics_handler,
    render::get_document,
    secrets::refresh_secrets,
};
use crate::metrics::http::http_metrics_middleware;
use crate::middleware::{LogOptions, LoggingLayer, RequestIdLayer};
use crate::state::AppState;

/// Builds the full router.
///
/// Route groups carry their own [`LoggingLayer`] label; request ids, error
/// envelopes, HTTP metrics and tracing wrap everything.
pub fn create_router(state: AppState, prometheus_handle: PrometheusHandle) -> Router {
    let config_routes = Router::new()
        .route("/{app}/{profile}", get(get_config))
        .route("/{app}/{profile}/{label}", get(get_config_with_label))
        .route("/{name}", get(get_document))
        .layer(LoggingLayer::new("CONFIG"));

    let secrets_routes = Router::new()
        .route("/actuator/secrets/refresh", post(refresh_secrets))
        .layer(LoggingLayer::new("SECRETS_REFRESH").with_options(LogOptions {
            log_params: false,
            log_result: true,
            log_duration: true,
        }));

    let actuator_routes = Router::new()
        .route("/health", get(health_check))
        .route("/actuator/repository", get(repository_status))
        .layer(LoggingLayer::new("ACTUATOR").with_options(LogOptions {
            log_params: false,
            log_result: true,
            log_duration: false,
        }));

    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(prometheus_handle);

    let app_router = Router::new()
        .merge(config_routes)
        .merge(secrets_routes)
        .merge(actuator_routes)
        .fallback(not_found)
        .with_state(state);

    let middleware_stack = ServiceBuilder::new()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .layer(RequestIdLayer)
        .layer(CorsLayer::permissive());

    Router::new()
        .merge(app_router)
        .merge(metrics_router)
        .layer(middleware::from_fn(error_envelope))
        .layer(middleware::from_fn(http_metrics_middleware))
        .layer(middleware_stack)
}

/// Serves `router` on `addr` until ctrl-c or SIGTERM.
pub async fn run_server(addr: SocketAddr, router: Router) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
