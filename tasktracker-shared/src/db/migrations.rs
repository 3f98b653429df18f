/// Embedded schema migrations
///
/// SQL files live in `tasktracker-shared/migrations/` and are compiled into
/// the binary with `sqlx::migrate!`:
///
/// - `tasks`: reminder tasks
/// - `auth_codes`: hashed one-time login codes

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Applies every pending migration
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    match sqlx::migrate!("./migrations").run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
