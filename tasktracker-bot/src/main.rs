//! # Task Tracker Bot
//!
//! Long-polls Telegram and runs the conversational intake loop. Applies
//! database migrations on startup.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p tasktracker-bot
//! ```

use std::sync::Arc;
use tasktracker_bot::config::{BotConfig, SessionBackend, EVENT_CHANNEL_CAPACITY};
use tasktracker_bot::intake::IntakeMachine;
use tasktracker_bot::poller::UpdatePoller;
use tasktracker_bot::runner::IntakeLoop;
use tasktracker_bot::session::{InMemorySessionStore, KvSessionStore, SessionStore};
use tasktracker_shared::auth::{CredentialConfig, CredentialService};
use tasktracker_shared::clock::SystemClock;
use tasktracker_shared::db::{migrations::run_migrations, pool};
use tasktracker_shared::redis::{RedisClient, RedisConfig};
use tasktracker_shared::repository::PgTaskRepository;
use tasktracker_shared::service::TaskService;
use tasktracker_shared::telegram::{TelegramClient, TelegramConfig};
use tasktracker_shared::{config, telemetry};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::load_dotenv();
    telemetry::init_tracing("tasktracker_bot=debug,tasktracker_shared=info");

    tracing::info!("Task Tracker Bot v{} starting...", env!("CARGO_PKG_VERSION"));

    let bot_config = BotConfig::from_env()?;
    let credential_config = CredentialConfig::from_env()?;
    let telegram = TelegramClient::new(TelegramConfig::from_env()?)?;

    let db = pool::create_pool(pool::DatabaseConfig::from_env()?).await?;
    run_migrations(&db).await?;

    let redis = RedisClient::new(RedisConfig::from_env()?).await?;

    let me = telegram.get_me().await?;
    tracing::info!(bot = ?me.username, "Telegram credentials verified");

    let clock = Arc::new(SystemClock);
    let repo = Arc::new(PgTaskRepository::new(db.clone()));
    let kv = Arc::new(redis);

    let sessions: Arc<dyn SessionStore> = match bot_config.session_backend {
        SessionBackend::Redis => Arc::new(KvSessionStore::new(kv.clone(), bot_config.session_ttl)),
        SessionBackend::Memory => Arc::new(InMemorySessionStore::new()),
    };

    let machine = IntakeMachine::new(
        TaskService::new(repo.clone(), clock.clone()),
        CredentialService::new(kv, repo, clock, credential_config),
        sessions,
        Arc::new(telegram.clone()),
    );

    let shutdown = CancellationToken::new();
    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

    let poller = tokio::spawn(UpdatePoller::new(Arc::new(telegram)).run(tx, shutdown.clone()));
    let intake = tokio::spawn(
        IntakeLoop::new(Arc::new(machine), bot_config.event_timeout).run(rx, shutdown.clone()),
    );

    tracing::info!(
        session_backend = ?bot_config.session_backend,
        "Bot ready and polling for updates"
    );

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received, stopping...");
    shutdown.cancel();

    poller.await?;
    intake.await?;
    pool::close_pool(db).await;

    tracing::info!("Bot stopped");
    Ok(())
}
