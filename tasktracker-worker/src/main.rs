//! # Task Tracker Worker
//!
//! Runs the deadline notification scheduler: scans for tasks due within
//! the lookahead window and sends each owner a Telegram reminder.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p tasktracker-worker
//! ```

use std::sync::Arc;
use tasktracker_shared::clock::SystemClock;
use tasktracker_shared::db::pool;
use tasktracker_shared::repository::PgTaskRepository;
use tasktracker_shared::telegram::{TelegramClient, TelegramConfig};
use tasktracker_shared::{config, telemetry};
use tasktracker_worker::scheduler::{DeadlineScheduler, SchedulerConfig};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::load_dotenv();
    telemetry::init_tracing("tasktracker_worker=debug,tasktracker_shared=info");

    tracing::info!(
        "Task Tracker Worker v{} starting...",
        tasktracker_worker::VERSION
    );

    let scheduler_config = SchedulerConfig::from_env()?;
    let telegram = TelegramClient::new(TelegramConfig::from_env()?)?;
    let db = pool::create_pool(pool::DatabaseConfig::from_env()?).await?;

    let scheduler = Arc::new(DeadlineScheduler::new(
        Arc::new(PgTaskRepository::new(db.clone())),
        Arc::new(telegram),
        Arc::new(SystemClock),
        scheduler_config,
    ));

    let shutdown = CancellationToken::new();
    let handle = tokio::spawn({
        let scheduler = scheduler.clone();
        let shutdown = shutdown.clone();
        async move { scheduler.run(shutdown).await }
    });

    tracing::info!("Worker ready");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received, exiting...");
    shutdown.cancel();

    handle.await?;
    pool::close_pool(db).await;

    Ok(())
}
