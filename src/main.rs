use comparatif_server::config::Config;
use comparatif_server::http::{create_router, AppState};
use comparatif_server::services::{ChromePdfRenderer, DocumentProducer, SvgChartRenderer};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match dotenvy::dotenv() {
        Ok(path) => eprintln!(".env loaded from: {:?}", path),
        Err(e) => eprintln!(".env not found: {}", e),
    }

    let config = Arc::new(Config::from_env()?);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Config loaded");
    tracing::info!("   HTTP Addr: {}", config.http_addr);
    tracing::info!("   Media root: {}", config.media_root.display());
    tracing::info!("   Date zone: {}", config.date_zone);
    tracing::info!(
        "   Chart policy: gas={:?} electricity={:?}",
        config.chart_policy_gas,
        config.chart_policy_electricity
    );
    tracing::info!("   Page filter: {}", config.page_filter);
    tracing::info!("   Headless: {}", config.headless);

    tokio::fs::create_dir_all(&config.media_root).await?;

    let producer = DocumentProducer::new(
        config.clone(),
        Arc::new(SvgChartRenderer::default()),
        Arc::new(ChromePdfRenderer::new(config.clone())),
    )?;
    let state = AppState::new(config.clone(), producer);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    tracing::info!("Listening on http://{}", config.http_addr);
    tracing::info!("Endpoints:");
    tracing::info!("   GET  /health");
    tracing::info!("   POST /api/v1/presentation");
    tracing::info!("   POST /volt-consulting/presentation");

    axum::serve(listener, app).await?;

    Ok(())
}
