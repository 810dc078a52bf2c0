use anyhow::Context;
use packeta_api::{app, AppState};
use packeta_fulfillment::PacketaFulfillmentService;
use packeta_store::app_config::Config;
use packeta_store::InMemoryFulfillmentRepository;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "packeta_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Packeta API on port {}", config.server.port);

    // The host pipeline owns persistence; this process keeps records in memory.
    let fulfillments = Arc::new(InMemoryFulfillmentRepository::new());
    let options = config.packeta.clone();
    let service = PacketaFulfillmentService::from_options(options, fulfillments)
        .context("Failed to configure Packeta fulfillment provider")?;

    let app = app(AppState::new(Arc::new(service)));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
