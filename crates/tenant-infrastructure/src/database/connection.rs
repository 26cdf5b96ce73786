//! Database connection pool

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;

/// Lazy pool: no connection is opened until the first query.
pub fn create_pool(url: &str, max_connections: u32, acquire_timeout_ms: u64) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_millis(acquire_timeout_ms))
        .connect_lazy(url)
}
