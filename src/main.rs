use std::net::SocketAddr;

use diligence_backend::{
    config::{Config, LogFormat},
    database::Database,
    routes, AppState,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    if config.jwt_secret_is_fallback {
        tracing::warn!("JWT_SECRET is not set, using the built-in development secret");
    }

    let db = Database::from_config(&config);
    db.pool().await?;
    info!(url = db.url(), "database ready");

    let state = AppState::new(db.clone(), config);
    if let Some(seed) = state.config.seed_admin.as_ref() {
        state.user_service.ensure_admin(seed).await?;
    }

    let addr: SocketAddr = state.config.server_address.parse()?;
    let app = routes::build_router(state);

    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received");
}
