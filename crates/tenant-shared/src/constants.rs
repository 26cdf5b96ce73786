//! Application-wide constants

pub const PRIMARY_SHARD: usize = 0;
pub const DEFAULT_SHARD_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_ACQUIRE_TIMEOUT_MS: u64 = 3_000;
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 2_000;

/// Sentinel used in persisted plan limits for "no ceiling".
pub const UNLIMITED: i64 = -1;

pub const WARNING_THRESHOLD_PERCENT: u8 = 80;
pub const CRITICAL_THRESHOLD_PERCENT: u8 = 100;

pub const BYTES_PER_MB: u64 = 1024 * 1024;

pub const WORKSPACE_CHANNEL_PREFIX: &str = "workspace:";
pub const DEFAULT_EVENT_BUS_CAPACITY: usize = 1024;
