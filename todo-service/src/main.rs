use service_core::observability::init_tracing;
use todo_service::config::TodoConfig;
use todo_service::services::init_metrics;
use todo_service::startup::Application;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    let config = TodoConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing("todo-service", "info", config.otlp_endpoint.as_deref())?;

    // Must run before any metric is recorded.
    init_metrics();

    tracing::info!("Initializing server...");
    if dotenv.is_err() {
        tracing::info!("No .env file found");
    }

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to start todo-service: {}", e);
        anyhow::anyhow!("Startup error: {}", e)
    })?;

    app.run_until_stopped().await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
