use listing_fraud_screener::{
    api::{build_router, AppState},
    config::Config,
    ml::FraudPipeline,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configuration drives the log filter, so load it first
    let config = Config::load()?;

    // Initialize tracing
    let registry = tracing_subscriber::registry().with(config.observability.env_filter());
    if config.observability.json_logs {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting listing fraud screener v{}", env!("CARGO_PKG_VERSION"));

    // Load the fitted pipeline; a missing or corrupt artifact is fatal
    let pipeline = FraudPipeline::load(&config.model.artifact_path)?;
    tracing::info!(
        artifact = %config.model.artifact_path.display(),
        vocab_size = pipeline.metadata().vocab_size,
        n_training_samples = pipeline.metadata().n_training_samples,
        holdout_accuracy = ?pipeline.metadata().holdout_accuracy,
        "Pipeline artifact loaded"
    );

    // Create application state and router
    let app_state = AppState::new(Arc::new(pipeline));
    let app = build_router(app_state);

    // Start HTTP server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("HTTP API server listening on http://{}", addr);
    tracing::info!("   Health check: http://{}/health", addr);
    tracing::info!("   Screening endpoint: http://{}/check-product", addr);

    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    tokio::select! {
        _ = server => {
            tracing::warn!("HTTP server stopped");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    tracing::info!("Shutting down gracefully...");
    Ok(())
}
