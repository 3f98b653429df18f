/// In-memory task repository
///
/// Implements the same contract as the PostgreSQL repository. Useful for
/// tests and for running the components without a database. Storage
/// failures can be simulated with [`InMemoryTaskRepository::set_unavailable`].

use super::TaskRepository;
use crate::error::StorageError;
use crate::models::task::{NewTask, Task};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Stored one-time code record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCode {
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    tasks: BTreeMap<i64, Task>,
    codes: HashMap<i64, StoredCode>,
}

#[derive(Debug, Default)]
pub struct InMemoryTaskRepository {
    state: Mutex<State>,
    unavailable: AtomicBool,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// While set, every operation fails with a storage error
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Snapshot of every stored task, notified or not
    pub fn all_tasks(&self) -> Vec<Task> {
        self.state().tasks.values().cloned().collect()
    }

    pub fn task(&self, id: i64) -> Option<Task> {
        self.state().tasks.get(&id).cloned()
    }

    pub fn one_time_code(&self, owner_id: i64) -> Option<StoredCode> {
        self.state().codes.get(&owner_id).cloned()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, task: NewTask) -> Result<(), StorageError> {
        self.check_available()?;

        let mut state = self.state();
        state.next_id += 1;
        let id = state.next_id;
        state.tasks.insert(
            id,
            Task {
                id,
                owner_id: task.owner_id,
                title: task.title,
                deadline: task.deadline,
                notified: false,
                created_at: Utc::now(),
            },
        );

        Ok(())
    }

    async fn get_active_tasks(&self, due_before: DateTime<Utc>) -> Result<Vec<Task>, StorageError> {
        self.check_available()?;

        Ok(self
            .state()
            .tasks
            .values()
            .filter(|t| t.is_due(due_before))
            .cloned()
            .collect())
    }

    async fn get_tasks_by_owner(&self, owner_id: i64) -> Result<Vec<Task>, StorageError> {
        self.check_available()?;

        let mut tasks: Vec<Task> = self
            .state()
            .tasks
            .values()
            .filter(|t| t.owner_id == owner_id && !t.notified)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| (t.deadline, t.id));

        Ok(tasks)
    }

    async fn mark_notified(&self, task_id: i64) -> Result<bool, StorageError> {
        self.check_available()?;

        match self.state().tasks.get_mut(&task_id) {
            Some(task) if !task.notified => {
                task.notified = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_by_id(&self, task_id: i64) -> Result<(), StorageError> {
        self.check_available()?;

        self.state().tasks.remove(&task_id);
        Ok(())
    }

    async fn save_one_time_code(
        &self,
        owner_id: i64,
        code_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        self.check_available()?;

        self.state().codes.insert(
            owner_id,
            StoredCode {
                code_hash: code_hash.to_string(),
                expires_at,
            },
        );
        Ok(())
    }
}
