/// Task model
///
/// A task is a titled deadline owned by one chat user. It is created by the
/// intake flow or the HTTP API, flipped to `notified` exactly once by the
/// deadline scheduler, and otherwise only ever deleted.
///
/// # Lifecycle
///
/// ```text
/// created (notified = false) ──reminder delivered──> notified = true
///        │
///        └──user deletes──> gone
/// ```
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id BIGSERIAL PRIMARY KEY,
///     user_id BIGINT NOT NULL,
///     title TEXT NOT NULL,
///     deadline TIMESTAMPTZ NOT NULL,
///     notified BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Task ID
    pub id: i64,

    /// Chat user who owns the task
    #[sqlx(rename = "user_id")]
    pub owner_id: i64,

    /// What to be reminded about
    pub title: String,

    /// When the reminder is due
    pub deadline: DateTime<Utc>,

    /// Whether the reminder has been delivered
    pub notified: bool,

    /// When the task was created
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Text sent to the owner when the deadline comes up
    pub fn reminder_text(&self) -> String {
        format!("⏰ Reminder: {}", self.title)
    }

    /// Whether the task falls inside the scheduler's due window
    pub fn is_due(&self, due_before: DateTime<Utc>) -> bool {
        !self.notified && self.deadline <= due_before
    }
}

/// Input for creating a task
///
/// Already validated: non-empty title, deadline in the future.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub owner_id: i64,
    pub title: String,
    pub deadline: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn task(deadline: DateTime<Utc>, notified: bool) -> Task {
        Task {
            id: 1,
            owner_id: 7,
            title: "Buy milk".to_string(),
            deadline,
            notified,
            created_at: deadline - Duration::days(1),
        }
    }

    #[test]
    fn test_reminder_text() {
        let t = task(Utc::now(), false);
        assert_eq!(t.reminder_text(), "⏰ Reminder: Buy milk");
    }

    #[test]
    fn test_is_due() {
        let deadline = Utc.with_ymd_and_hms(2026, 1, 2, 15, 4, 0).unwrap();

        assert!(task(deadline, false).is_due(deadline));
        assert!(task(deadline, false).is_due(deadline + Duration::minutes(15)));
        assert!(!task(deadline, false).is_due(deadline - Duration::minutes(1)));
        assert!(!task(deadline, true).is_due(deadline + Duration::minutes(15)));
    }
}
