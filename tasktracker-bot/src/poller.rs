/// Telegram long-poll front door
///
/// Pulls updates with `getUpdates`, acknowledges button presses, and hands
/// the resulting events to the intake loop in arrival order. Transport
/// errors are logged and retried after a short pause; they never stop the
/// poller.

use crate::events::InboundEvent;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tasktracker_shared::telegram::types::Update;
use tasktracker_shared::telegram::{TelegramClient, TelegramError};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Pause after a failed poll
pub const RETRY_DELAY: Duration = Duration::from_secs(3);

/// Where updates come from
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Updates with `update_id >= offset`, blocking until some arrive or
    /// the long-poll window closes
    async fn poll(&self, offset: i64) -> Result<Vec<Update>, TelegramError>;

    /// Acknowledges a button press so the client stops its spinner
    async fn acknowledge(&self, callback_query_id: &str) -> Result<(), TelegramError>;
}

#[async_trait]
impl UpdateSource for TelegramClient {
    async fn poll(&self, offset: i64) -> Result<Vec<Update>, TelegramError> {
        self.get_updates(offset).await
    }

    async fn acknowledge(&self, callback_query_id: &str) -> Result<(), TelegramError> {
        self.answer_callback_query(callback_query_id, None).await
    }
}

pub struct UpdatePoller {
    source: Arc<dyn UpdateSource>,
    retry_delay: Duration,
}

impl UpdatePoller {
    pub fn new(source: Arc<dyn UpdateSource>) -> Self {
        Self {
            source,
            retry_delay: RETRY_DELAY,
        }
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Polls until cancelled or until the intake loop goes away
    pub async fn run(self, events: mpsc::Sender<InboundEvent>, shutdown: CancellationToken) {
        tracing::info!("Update poller starting");
        let mut offset = 0;

        loop {
            let polled = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                polled = self.source.poll(offset) => polled,
            };

            let updates = match polled {
                Ok(updates) => updates,
                Err(e) => {
                    tracing::warn!(error = %e, "Polling for updates failed");
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(self.retry_delay) => continue,
                    }
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);

                if let Some(callback) = &update.callback_query {
                    if let Err(e) = self.source.acknowledge(&callback.id).await {
                        tracing::warn!(error = %e, "Failed to acknowledge callback");
                    }
                }

                let Some(event) = InboundEvent::from_update(&update) else {
                    tracing::trace!(update_id = update.update_id, "Ignoring update");
                    continue;
                };

                if events.send(event).await.is_err() {
                    tracing::info!("Intake loop closed, stopping poller");
                    return;
                }
            }
        }

        tracing::info!("Update poller stopped");
    }
}
