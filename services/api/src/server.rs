use crate::cli::ServeArgs;
use crate::infra::{seed_sample_data, AppState};
use crate::routes::with_performance_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Local;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use targeti::config::AppConfig;
use targeti::error::AppError;
use targeti::performance::{InMemoryPerformanceStore, PerformanceService};
use targeti::telemetry;
use tracing::info;

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
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryPerformanceStore::default());
    let performance_service = Arc::new(PerformanceService::new(repository));
    if config.dashboard.seed_sample_data {
        seed_sample_data(&*performance_service, Local::now().date_naive())?;
    }

    let app = with_performance_routes(performance_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "sales performance dashboard ready");

    axum::serve(listener, app).await?;
    Ok(())
}
