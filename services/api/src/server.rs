use crate::cli::ServeArgs;
use crate::images::ImageRoutesState;
use crate::infra::{AppState, InMemoryImageStore, InMemoryPetStore, InMemoryUserDirectory};
use crate::routes::with_service_routes;
use adopet::config::AppConfig;
use adopet::error::AppError;
use adopet::telemetry;
use adopet::workflows::adoption::{AdoptionService, AdoptionState, ListingGuard};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
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

    let identities = Arc::new(InMemoryUserDirectory::default());
    let adoption_service = Arc::new(AdoptionService::new(
        Arc::new(InMemoryPetStore::default()),
        config.adoption.clone(),
    ));
    let images = ImageRoutesState {
        images: Arc::new(InMemoryImageStore::default()),
        identities: identities.clone(),
        guard: Arc::new(ListingGuard::from_config(&config.adoption)),
    };

    let app = with_service_routes(AdoptionState::new(adoption_service, identities), images)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "adoption service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
