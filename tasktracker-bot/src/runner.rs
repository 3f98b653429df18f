/// Intake loop
///
/// The single consumer of inbound events. Events are handled strictly one
/// at a time, so a user's session is never touched concurrently. Each event
/// gets a fixed time budget; when it runs out the event is abandoned and
/// whatever session write already happened is kept.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use tasktracker_bot::intake::IntakeMachine;
/// use tasktracker_bot::runner::IntakeLoop;
/// use tokio::sync::mpsc;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example(machine: IntakeMachine) {
/// let (tx, rx) = mpsc::channel(100);
/// let shutdown = CancellationToken::new();
///
/// let intake = IntakeLoop::new(Arc::new(machine), Duration::from_secs(5));
/// tokio::spawn(intake.run(rx, shutdown.clone()));
/// # drop(tx);
/// # }
/// ```

use crate::events::InboundEvent;
use crate::intake::IntakeMachine;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub struct IntakeLoop {
    machine: Arc<IntakeMachine>,
    event_timeout: Duration,
}

impl IntakeLoop {
    pub fn new(machine: Arc<IntakeMachine>, event_timeout: Duration) -> Self {
        Self {
            machine,
            event_timeout,
        }
    }

    /// Runs until cancelled or until every sender is dropped
    pub async fn run(self, mut events: mpsc::Receiver<InboundEvent>, shutdown: CancellationToken) {
        tracing::info!(
            event_timeout_ms = self.event_timeout.as_millis() as u64,
            "Intake loop starting"
        );

        loop {
            let event = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };

            self.process(event).await;
        }

        tracing::info!("Intake loop stopped");
    }

    async fn process(&self, event: InboundEvent) {
        let user_id = event.user_id;

        match tokio::time::timeout(self.event_timeout, self.machine.handle(event)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(user_id, error = %e, "Event handled with errors"),
            Err(_) => tracing::warn!(
                user_id,
                timeout_ms = self.event_timeout.as_millis() as u64,
                "Event processing timed out"
            ),
        }
    }
}
