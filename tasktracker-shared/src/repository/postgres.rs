/// PostgreSQL task repository
///
/// # Example
///
/// ```no_run
/// use tasktracker_shared::db::pool::{create_pool, DatabaseConfig};
/// use tasktracker_shared::models::NewTask;
/// use tasktracker_shared::repository::{PgTaskRepository, TaskRepository};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::from_env()?).await?;
/// let repo = PgTaskRepository::new(pool);
///
/// repo.create(NewTask {
///     owner_id: 7,
///     title: "Buy milk".to_string(),
///     deadline: chrono::Utc::now() + chrono::Duration::hours(1),
/// })
/// .await?;
/// # Ok(())
/// # }
/// ```

use super::TaskRepository;
use crate::error::StorageError;
use crate::models::task::{NewTask, Task};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

#[derive(Debug, Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn create(&self, task: NewTask) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO tasks (user_id, title, deadline)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(task.owner_id)
        .bind(task.title)
        .bind(task.deadline)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_active_tasks(&self, due_before: DateTime<Utc>) -> Result<Vec<Task>, StorageError> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, deadline, notified, created_at
            FROM tasks
            WHERE notified = FALSE AND deadline <= $1
            "#,
        )
        .bind(due_before)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn get_tasks_by_owner(&self, owner_id: i64) -> Result<Vec<Task>, StorageError> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, deadline, notified, created_at
            FROM tasks
            WHERE user_id = $1 AND notified = FALSE
            ORDER BY deadline ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    async fn mark_notified(&self, task_id: i64) -> Result<bool, StorageError> {
        let result = sqlx::query("UPDATE tasks SET notified = TRUE WHERE id = $1 AND notified = FALSE")
            .bind(task_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_id(&self, task_id: i64) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(task_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn save_one_time_code(
        &self,
        owner_id: i64,
        code_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO auth_codes (user_id, code_hash, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id)
            DO UPDATE SET code_hash = EXCLUDED.code_hash,
                          expires_at = EXCLUDED.expires_at,
                          created_at = NOW()
            "#,
        )
        .bind(owner_id)
        .bind(code_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
