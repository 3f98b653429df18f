/// Task service
///
/// The operations the conversational and HTTP front doors call. Creation
/// validates input before touching storage; listing and deletion are thin
/// pass-throughs to the repository.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use tasktracker_shared::clock::SystemClock;
/// use tasktracker_shared::repository::InMemoryTaskRepository;
/// use tasktracker_shared::service::TaskService;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = TaskService::new(Arc::new(InMemoryTaskRepository::new()), Arc::new(SystemClock));
/// service.create_task(7, "Buy milk", "2.1.2099 15:04").await?;
/// assert_eq!(service.list_tasks(7).await?.len(), 1);
/// # Ok(())
/// # }
/// ```

use crate::clock::Clock;
use crate::deadline::parse_deadline;
use crate::error::{StorageError, TaskError, ValidationError};
use crate::models::task::{NewTask, Task};
use crate::repository::TaskRepository;
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Clone)]
pub struct TaskService {
    repo: Arc<dyn TaskRepository>,
    clock: Arc<dyn Clock>,
}

impl TaskService {
    pub fn new(repo: Arc<dyn TaskRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    pub fn repository(&self) -> &Arc<dyn TaskRepository> {
        &self.repo
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Validates and stores a new task
    ///
    /// # Errors
    ///
    /// - `TaskError::Validation` if the title is empty, the deadline does not
    ///   match `D.M.YYYY HH:MM`, or the deadline is not after now
    /// - `TaskError::Storage` if the write fails
    pub async fn create_task(
        &self,
        owner_id: i64,
        title: &str,
        deadline: &str,
    ) -> Result<(), TaskError> {
        let task = validate_new_task(owner_id, title, deadline, self.clock.now())?;

        self.repo.create(task).await?;

        tracing::info!(owner_id, "Task created");
        Ok(())
    }

    /// The owner's pending tasks, earliest deadline first
    pub async fn list_tasks(&self, owner_id: i64) -> Result<Vec<Task>, StorageError> {
        self.repo.get_tasks_by_owner(owner_id).await
    }

    /// Deletes a task by id
    pub async fn delete_task(&self, task_id: i64) -> Result<(), StorageError> {
        self.repo.delete_by_id(task_id).await?;

        tracing::info!(task_id, "Task deleted");
        Ok(())
    }
}

/// Builds a [`NewTask`] if the input is acceptable at `now`
pub fn validate_new_task(
    owner_id: i64,
    title: &str,
    deadline: &str,
    now: DateTime<Utc>,
) -> Result<NewTask, ValidationError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ValidationError::new("Task title must not be empty"));
    }

    let deadline = parse_deadline(deadline)?;
    if deadline <= now {
        return Err(ValidationError::new("The deadline must be in the future"));
    }

    Ok(NewTask {
        owner_id,
        title: title.to_string(),
        deadline,
    })
}
