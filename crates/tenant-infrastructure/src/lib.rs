//! # Tenant Infrastructure
//! 
//! Shard routing and the PostgreSQL adapters behind the core ports.

pub mod database;
pub mod shard;

pub use database::{
    create_pool, PgActivityRepository, PgBillingLogRepository, PgUsageRepository, PgWorkspaceRepository,
};
pub use shard::{shard_index, ShardError, ShardPool, ShardRouter, ShardStatus};
