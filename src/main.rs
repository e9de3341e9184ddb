use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use cinelog_api::config::Config;
use cinelog_api::db;
use cinelog_api::repository::postgres::PgStore;
use cinelog_api::routes::{create_router, AppState};
use cinelog_api::services::catalog::tmdb::TmdbCatalog;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;

    let state = AppState {
        store: Arc::new(PgStore::new(pool)),
        catalog: Arc::new(TmdbCatalog::new(
            config.tmdb_api_key.clone(),
            config.tmdb_api_url.clone(),
        )),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
