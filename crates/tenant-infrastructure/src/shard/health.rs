//! Readiness probing across shards

use std::time::Instant;

use serde::Serialize;
use sqlx::PgPool;
use tokio::time::timeout;
use tracing::warn;

use crate::shard::router::ShardRouter;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShardStatus {
    pub shard: usize,
    pub healthy: bool,
    pub latency_ms: Option<u64>,
}

impl ShardRouter<PgPool> {
    /// `SELECT 1` against every configured shard, each under the probe timeout.
    pub async fn probe_all(&self) -> Vec<ShardStatus> {
        let mut statuses = Vec::new();

        for (shard, pool) in self.pool().configured() {
            let started = Instant::now();
            let outcome = timeout(self.probe_timeout(), sqlx::query("SELECT 1").execute(pool)).await;

            let healthy = match outcome {
                Ok(Ok(_)) => true,
                Ok(Err(e)) => {
                    warn!(shard, "Shard readiness probe failed: {}", e);
                    false
                }
                Err(_) => {
                    warn!(shard, "Shard readiness probe timed out");
                    false
                }
            };

            statuses.push(ShardStatus {
                shard,
                healthy,
                latency_ms: healthy.then(|| started.elapsed().as_millis() as u64),
            });
        }

        statuses
    }
}
