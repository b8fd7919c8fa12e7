//! # Workasana API Server
//!
//! Task-management REST API: users, projects, teams, tags and tasks, with
//! name-based task queries and reporting endpoints.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/workasana \
//! JWT_SECRET=$(openssl rand -hex 32) \
//! cargo run -p workasana-api
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use workasana_api::{
    app::{build_router, AppState},
    config::Config,
};
use workasana_shared::db::{migrations::run_migrations, pool};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "workasana_api=debug,workasana_shared=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Workasana API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let db = pool::create_pool(pool::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;

    run_migrations(&db).await?;

    let address = config.bind_address();
    let app = build_router(AppState::new(db.clone(), config));

    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool::close_pool(db).await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
