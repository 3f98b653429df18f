//! # Task Tracker API Server
//!
//! HTTP access to a user's tasks. Users log in with a one-time code issued
//! by the bot (`/code`) and then use bearer access tokens.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p tasktracker-api
//! ```

use std::sync::Arc;
use tasktracker_api::{
    app::{build_router, AppState},
    config::Config,
};
use tasktracker_shared::auth::CredentialService;
use tasktracker_shared::clock::SystemClock;
use tasktracker_shared::db::pool;
use tasktracker_shared::redis::{RedisClient, RedisConfig};
use tasktracker_shared::repository::PgTaskRepository;
use tasktracker_shared::service::TaskService;
use tasktracker_shared::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tasktracker_shared::config::load_dotenv();
    telemetry::init_tracing("tasktracker_api=debug,tower_http=debug");

    tracing::info!(
        "Task Tracker API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;
    let db = pool::create_pool(config.database.clone()).await?;
    let redis = Arc::new(RedisClient::new(RedisConfig::from_env()?).await?);

    let clock = Arc::new(SystemClock);
    let repo = Arc::new(PgTaskRepository::new(db.clone()));

    let bind_address = config.bind_address();
    let state = AppState::new(
        TaskService::new(repo.clone(), clock.clone()),
        CredentialService::new(redis, repo, clock, config.credentials.clone()),
        config,
    )
    .with_database(db.clone());

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
            tracing::info!("Shutdown signal received, draining connections...");
        })
        .await?;

    pool::close_pool(db).await;
    tracing::info!("Server stopped");
    Ok(())
}
