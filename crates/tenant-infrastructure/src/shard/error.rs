use thiserror::Error;

/// Startup-time shard configuration failures. Per-request shard trouble is
/// reported as `DomainError::ShardUnavailable` instead.
#[derive(Error, Debug)]
pub enum ShardError {
    #[error("No shards configured: {0}")]
    NoShardsConfigured(String),

    #[error("Invalid connection settings for shard {shard}: {reason}")]
    InvalidShard { shard: usize, reason: String },

    #[error("Migration failed on shard {shard}: {reason}")]
    MigrationFailed { shard: usize, reason: String },
}
