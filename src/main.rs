use recipebook::{config::AppConfig, telemetry, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init();

    let config = AppConfig::from_env()?;
    let state = AppState::init(config).await?;

    tracing::info!(
        backend = state.store().backend(),
        max_connections = state.config.max_connections,
        "recipebook ready"
    );
    Ok(())
}
