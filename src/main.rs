use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use tutor_ia_server::{
    AppState, app,
    config::Config,
    db::{self, user_store::UserStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tutor_ia_server=debug,tower_http=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = db::init_db_pool(&config.database_url, config.max_pool_size)
        .await
        .with_context(|| format!("failed to open database {}", config.database_url))?;
    let state = AppState::new(Arc::new(UserStore::new(pool)));

    let addr = config.server_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!("Starting Tutor IA server on {}...", addr);
    axum::serve(listener, app(state)).await?;

    Ok(())
}
