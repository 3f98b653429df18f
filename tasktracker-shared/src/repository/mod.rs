/// Repository contract
///
/// Every component reaches persistent storage through [`TaskRepository`] and
/// nothing else. Two implementations ship with the crate:
///
/// - [`postgres::PgTaskRepository`]: the production store (sqlx)
/// - [`memory::InMemoryTaskRepository`]: an in-process fake for tests and local runs
///
/// # Writers
///
/// ```text
/// intake / HTTP ──create, delete_by_id──> tasks
/// scheduler     ──mark_notified─────────> tasks.notified
/// credentials   ──save_one_time_code────> auth_codes
/// ```

use crate::error::StorageError;
use crate::models::task::{NewTask, Task};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryTaskRepository;
pub use postgres::PgTaskRepository;

#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Inserts a task with `notified = false` in one atomic write
    async fn create(&self, task: NewTask) -> Result<(), StorageError>;

    /// Tasks with `notified = false` and `deadline <= due_before`, in no
    /// particular order
    async fn get_active_tasks(&self, due_before: DateTime<Utc>) -> Result<Vec<Task>, StorageError>;

    /// An owner's tasks with `notified = false`, ordered by deadline ascending
    async fn get_tasks_by_owner(&self, owner_id: i64) -> Result<Vec<Task>, StorageError>;

    /// Flips `notified` from false to true
    ///
    /// Returns `true` if this call flipped the flag, `false` if it was already
    /// set or the task no longer exists. Repeating the call is not an error.
    async fn mark_notified(&self, task_id: i64) -> Result<bool, StorageError>;

    /// Deletes a task; deleting a missing task succeeds
    async fn delete_by_id(&self, task_id: i64) -> Result<(), StorageError>;

    /// Records the hash of the owner's current one-time code, replacing any
    /// previous record
    async fn save_one_time_code(
        &self,
        owner_id: i64,
        code_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StorageError>;
}
