use sqlx::PgPool;
use tracing::info;

use crate::shard::{ShardError, ShardRouter};

/// Every shard carries the same schema.
pub async fn run_migrations(router: &ShardRouter<PgPool>) -> Result<(), ShardError> {
    for (shard, pool) in router.pool().configured() {
        info!(shard, "Running database migrations");
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(|e| ShardError::MigrationFailed {
                shard,
                reason: e.to_string(),
            })?;
    }
    info!("Database migrations completed");
    Ok(())
}
