//! Shard pool and tenant-to-shard routing

pub mod error;
pub mod health;
pub mod pool;
pub mod router;

pub use error::ShardError;
pub use health::ShardStatus;
pub use pool::ShardPool;
pub use router::{shard_index, ShardRouter};
