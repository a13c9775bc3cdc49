use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use review_pipeline::config::AppConfig;
use review_pipeline::error::AppError;
use review_pipeline::telemetry;
use tracing::info;

use crate::cli::ServeArgs;
use crate::infra::{AppState, Pipeline};
use crate::routes::with_review_routes;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let pipeline = Pipeline::standard(config.checks)?;
    info!(
        checks = pipeline.executor.registry().len(),
        workflows = pipeline.service.workflows().len(),
        concurrency = config.checks.concurrency,
        timeout_ms = config.checks.timeout.as_millis() as u64,
        "review pipeline assembled"
    );

    let app = with_review_routes(pipeline.executor, pipeline.service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "review pipeline ready");

    axum::serve(listener, app).await?;
    Ok(())
}
