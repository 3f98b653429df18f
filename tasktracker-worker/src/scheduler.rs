/// Deadline notification scheduler
///
/// Every tick fetches the unnotified tasks whose deadline falls before
/// `now + lookahead`, sends each owner a reminder, and marks the task
/// notified once the reminder is delivered. A failed delivery leaves the
/// task unnotified so the next tick tries again.
///
/// # Tick
///
/// ```text
/// get_active_tasks(now + lookahead)
///   └─> for each task
///         ├─> notify(owner, "⏰ Reminder: <title>")
///         │     └─> failed: retry next tick
///         └─> mark_notified(task)
/// ```
///
/// A tick that cannot fetch tasks is logged and skipped; the loop keeps
/// running.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use tasktracker_shared::clock::SystemClock;
/// use tasktracker_shared::notify::RecordingNotifier;
/// use tasktracker_shared::repository::InMemoryTaskRepository;
/// use tasktracker_worker::scheduler::{DeadlineScheduler, SchedulerConfig};
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() {
/// let scheduler = DeadlineScheduler::new(
///     Arc::new(InMemoryTaskRepository::new()),
///     Arc::new(RecordingNotifier::new()),
///     Arc::new(SystemClock),
///     SchedulerConfig::default(),
/// );
///
/// let shutdown = CancellationToken::new();
/// scheduler.run(shutdown).await;
/// # }
/// ```

use chrono::Duration as ChronoDuration;
use std::sync::Arc;
use std::time::Duration;
use tasktracker_shared::clock::Clock;
use tasktracker_shared::config::{self, ConfigError};
use tasktracker_shared::notify::Notifier;
use tasktracker_shared::repository::TaskRepository;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between ticks
    pub tick_interval: Duration,

    /// How far ahead of its deadline a task becomes due
    pub lookahead: ChronoDuration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            tick_interval: Duration::from_secs(60),
            lookahead: ChronoDuration::minutes(15),
        }
    }
}

impl SchedulerConfig {
    /// Reads `SCHEDULER_TICK_SECS` and `SCHEDULER_LOOKAHEAD_MINUTES`
    pub fn from_env() -> Result<Self, ConfigError> {
        let tick_secs: u64 = config::optional("SCHEDULER_TICK_SECS", 60)?;
        let lookahead_minutes: i64 = config::optional("SCHEDULER_LOOKAHEAD_MINUTES", 15)?;

        if tick_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "SCHEDULER_TICK_SECS",
                reason: "must be positive".to_string(),
            });
        }
        if lookahead_minutes < 0 {
            return Err(ConfigError::Invalid {
                name: "SCHEDULER_LOOKAHEAD_MINUTES",
                reason: "must not be negative".to_string(),
            });
        }

        Ok(SchedulerConfig {
            tick_interval: Duration::from_secs(tick_secs),
            lookahead: ChronoDuration::minutes(lookahead_minutes),
        })
    }
}

/// Outcome of one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Due tasks fetched
    pub found: usize,

    /// Reminders delivered and recorded
    pub delivered: usize,

    /// Reminders that will be retried
    pub failed: usize,

    /// The fetch itself failed and the tick was skipped
    pub skipped: bool,
}

pub struct DeadlineScheduler {
    repo: Arc<dyn TaskRepository>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
}

impl DeadlineScheduler {
    pub fn new(
        repo: Arc<dyn TaskRepository>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: SchedulerConfig,
    ) -> Self {
        DeadlineScheduler {
            repo,
            notifier,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Ticks on the configured interval until cancelled
    ///
    /// The first tick runs immediately. Ticks missed while a slow tick was
    /// running are skipped rather than bunched up.
    pub async fn run(&self, shutdown: CancellationToken) {
        tracing::info!(
            tick_secs = self.config.tick_interval.as_secs(),
            lookahead_minutes = self.config.lookahead.num_minutes(),
            "Deadline scheduler starting"
        );

        let mut interval = tokio::time::interval(self.config.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {}
            }

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                report = self.tick() => {
                    if report.found > 0 || report.skipped {
                        tracing::info!(
                            found = report.found,
                            delivered = report.delivered,
                            failed = report.failed,
                            skipped = report.skipped,
                            "Scheduler tick finished"
                        );
                    }
                }
            }
        }

        tracing::info!("Deadline scheduler stopped");
    }

    /// Runs a single scan-and-deliver pass
    pub async fn tick(&self) -> TickReport {
        let due_before = self.clock.now() + self.config.lookahead;

        let tasks = match self.repo.get_active_tasks(due_before).await {
            Ok(tasks) => tasks,
            Err(e) => {
                tracing::error!(error = %e, "Failed to fetch due tasks, skipping tick");
                return TickReport {
                    skipped: true,
                    ..TickReport::default()
                };
            }
        };

        let mut report = TickReport {
            found: tasks.len(),
            ..TickReport::default()
        };

        for task in tasks {
            if let Err(e) = self
                .notifier
                .notify(task.owner_id, &task.reminder_text())
                .await
            {
                tracing::warn!(
                    task_id = task.id,
                    user_id = task.owner_id,
                    error = %e,
                    "Reminder delivery failed, will retry"
                );
                report.failed += 1;
                continue;
            }

            match self.repo.mark_notified(task.id).await {
                Ok(true) => {
                    tracing::debug!(task_id = task.id, user_id = task.owner_id, "Reminder sent");
                }
                Ok(false) => {
                    tracing::debug!(task_id = task.id, "Task already marked notified");
                }
                Err(e) => {
                    // Delivered but not recorded; the next tick may send it again
                    tracing::error!(task_id = task.id, error = %e, "Failed to mark task notified");
                }
            }
            report.delivered += 1;
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use tasktracker_shared::clock::FixedClock;
    use tasktracker_shared::models::NewTask;
    use tasktracker_shared::notify::RecordingNotifier;
    use tasktracker_shared::repository::InMemoryTaskRepository;

    struct Fixture {
        scheduler: DeadlineScheduler,
        repo: Arc<InMemoryTaskRepository>,
        notifier: Arc<RecordingNotifier>,
        clock: FixedClock,
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, 15, 0, 0).unwrap()
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(InMemoryTaskRepository::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let clock = FixedClock::new(start());
        let scheduler = DeadlineScheduler::new(
            repo.clone(),
            notifier.clone(),
            Arc::new(clock.clone()),
            SchedulerConfig::default(),
        );
        Fixture {
            scheduler,
            repo,
            notifier,
            clock,
        }
    }

    async fn add(repo: &InMemoryTaskRepository, owner_id: i64, title: &str, in_minutes: i64) {
        repo.create(NewTask {
            owner_id,
            title: title.to_string(),
            deadline: start() + ChronoDuration::minutes(in_minutes),
        })
        .await
        .unwrap();
    }

    #[test]
    fn test_config_default() {
        let config = SchedulerConfig::default();
        assert_eq!(config.tick_interval, Duration::from_secs(60));
        assert_eq!(config.lookahead, ChronoDuration::minutes(15));
    }

    #[tokio::test]
    async fn test_due_task_is_delivered_once() {
        let f = fixture();
        add(&f.repo, 7, "Buy milk", 4).await;

        let report = f.scheduler.tick().await;
        assert_eq!(
            report,
            TickReport {
                found: 1,
                delivered: 1,
                failed: 0,
                skipped: false
            }
        );
        assert_eq!(f.notifier.texts_for(7), vec!["⏰ Reminder: Buy milk"]);
        assert!(f.repo.all_tasks()[0].notified);

        let report = f.scheduler.tick().await;
        assert_eq!(report.found, 0);
        assert_eq!(f.notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn test_lookahead_window() {
        let f = fixture();
        add(&f.repo, 7, "inside", 15).await;
        add(&f.repo, 7, "outside", 16).await;

        let report = f.scheduler.tick().await;

        assert_eq!(report.found, 1);
        assert_eq!(f.notifier.texts_for(7), vec!["⏰ Reminder: inside"]);

        f.clock.advance(ChronoDuration::minutes(1));
        f.scheduler.tick().await;
        assert_eq!(f.notifier.texts_for(7).len(), 2);
    }

    #[tokio::test]
    async fn test_overdue_tasks_are_still_delivered() {
        let f = fixture();
        add(&f.repo, 7, "missed", 1).await;
        f.clock.advance(ChronoDuration::hours(3));

        assert_eq!(f.scheduler.tick().await.delivered, 1);
    }

    #[tokio::test]
    async fn test_delivery_failure_is_retried() {
        let f = fixture();
        add(&f.repo, 7, "Buy milk", 5).await;

        f.notifier.set_failing(true);
        let report = f.scheduler.tick().await;
        assert_eq!(report.failed, 1);
        assert_eq!(report.delivered, 0);
        assert!(!f.repo.all_tasks()[0].notified);

        f.notifier.set_failing(false);
        let report = f.scheduler.tick().await;
        assert_eq!(report.delivered, 1);
        assert!(f.repo.all_tasks()[0].notified);
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_tick() {
        let f = fixture();
        add(&f.repo, 7, "Buy milk", 5).await;

        f.repo.set_unavailable(true);
        let report = f.scheduler.tick().await;
        assert!(report.skipped);
        assert!(f.notifier.sent().is_empty());

        f.repo.set_unavailable(false);
        assert_eq!(f.scheduler.tick().await.delivered, 1);
    }

    #[tokio::test]
    async fn test_reminders_go_to_each_owner() {
        let f = fixture();
        add(&f.repo, 7, "mine", 5).await;
        add(&f.repo, 8, "theirs", 5).await;

        f.scheduler.tick().await;

        assert_eq!(f.notifier.texts_for(7), vec!["⏰ Reminder: mine"]);
        assert_eq!(f.notifier.texts_for(8), vec!["⏰ Reminder: theirs"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ticks_until_cancelled() {
        let f = fixture();
        add(&f.repo, 7, "Buy milk", 5).await;
        let scheduler = Arc::new(f.scheduler);
        let shutdown = CancellationToken::new();

        let handle = tokio::spawn({
            let scheduler = scheduler.clone();
            let shutdown = shutdown.clone();
            async move { scheduler.run(shutdown).await }
        });

        // First tick fires immediately
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(f.notifier.sent().len(), 1);

        add(&f.repo, 7, "Call mom", 5).await;
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(f.notifier.sent().len(), 2);

        shutdown.cancel();
        handle.await.unwrap();
    }
}
