mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    middleware::SessionAuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = pulseboard_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = pulseboard_db::PoolConfig::from_app_config(&config);
    let pool = pulseboard_db::connect_pool(&config.database_url, pool_config).await?;
    pulseboard_db::run_migrations(&pool).await?;

    let genai = match config.gemini_api_key.as_deref() {
        Some(key) => Some(Arc::new(pulseboard_genai::GeminiClient::new(
            key,
            &config.gemini_model,
            config.generation_timeout_secs,
        )?)),
        None => {
            tracing::warn!("GEMINI_API_KEY not set; generation endpoints will return errors");
            None
        }
    };

    let auth = SessionAuthState::from_env(matches!(
        config.env,
        pulseboard_core::Environment::Development
    ))?;
    let app = build_app(AppState { pool, genai }, auth);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
