use std::sync::Arc;

use anyhow::Context;

use tollgate_api::GateConfig;
use tollgate_infra::HttpOracleClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tollgate_observability::init();

    let config = GateConfig::from_env()?;
    let oracle = HttpOracleClient::new(
        config.backend_url.clone(),
        config.endpoints.clone(),
        config.oracle_timeout,
    )
    .context("failed to build status oracle client")?;

    let app = tollgate_api::app::build_app(&config, Arc::new(oracle));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        backend = %config.backend_url,
        "edge gate listening"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
