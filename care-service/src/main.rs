use care_service::{ServiceConfig, create_app, telemetry::init_tracing};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_env();
    init_tracing(config.log_format);

    let app = create_app(&config);
    let listener = TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    let addr = listener.local_addr()?;

    info!("Elderly care service starting on {}", addr);
    info!("Health check endpoint: http://{}/health", addr);
    info!("Upload endpoint: POST http://{}/api/reports/upload", addr);
    info!(
        max_upload_bytes = config.max_upload_bytes,
        "Sessions are kept in memory and never evicted"
    );

    axum::serve(listener, app).await?;

    Ok(())
}
