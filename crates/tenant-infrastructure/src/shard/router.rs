// ============================================================================
// Tenant Infrastructure - Shard Router
// File: crates/tenant-infrastructure/src/shard/router.rs
// ============================================================================
//! Deterministic tenant-to-shard routing and cross-shard lookups

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tenant_shared::constants::PRIMARY_SHARD;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::shard::pool::ShardPool;

/// Sum of the id's UTF-16 code units, modulo `shard_count`.
///
/// Changing the slot count reassigns most tenants, so it is effectively a
/// data migration.
pub fn shard_index(tenant_id: &str, shard_count: usize) -> usize {
    if shard_count == 0 {
        return PRIMARY_SHARD;
    }
    let sum: u64 = tenant_id.encode_utf16().map(u64::from).sum();
    (sum % shard_count as u64) as usize
}

pub struct ShardRouter<H> {
    pool: ShardPool<H>,
    probe_timeout: Duration,
}

impl<H: Clone> ShardRouter<H> {
    pub fn new(pool: ShardPool<H>, probe_timeout: Duration) -> Self {
        Self { pool, probe_timeout }
    }

    pub fn pool(&self) -> &ShardPool<H> {
        &self.pool
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// Slot that serves `tenant_id`. Empty ids and unconfigured slots resolve
    /// to the primary shard.
    pub fn resolve_index(&self, tenant_id: &str) -> usize {
        if tenant_id.is_empty() {
            return PRIMARY_SHARD;
        }
        let index = shard_index(tenant_id, self.pool.len());
        if self.pool.get(index).is_some() {
            index
        } else {
            debug!(shard = index, "Shard slot unconfigured, falling back to primary");
            PRIMARY_SHARD
        }
    }

    /// Handle for `tenant_id` along with the slot it came from. Never fails.
    pub fn client_for(&self, tenant_id: &str) -> (usize, &H) {
        let index = self.resolve_index(tenant_id);
        match self.pool.get(index) {
            Some(handle) => (index, handle),
            None => (PRIMARY_SHARD, self.pool.primary()),
        }
    }

    pub fn primary(&self) -> &H {
        self.pool.primary()
    }

    /// Probe every configured shard in index order and return the first hit
    /// with the slot it was found on.
    ///
    /// Probes run one at a time, each bounded by the probe timeout. A failing
    /// or slow shard is logged and skipped; `None` means no reachable shard
    /// had a match.
    pub async fn scatter_find<T, E, F, Fut>(&self, what: &str, probe: F) -> Option<(T, usize)>
    where
        F: Fn(usize, H) -> Fut,
        Fut: Future<Output = Result<Option<T>, E>>,
        E: Display,
    {
        for (index, handle) in self.pool.configured() {
            match timeout(self.probe_timeout, probe(index, handle.clone())).await {
                Ok(Ok(Some(found))) => {
                    debug!(shard = index, what, "Scatter lookup hit");
                    return Some((found, index));
                }
                Ok(Ok(None)) => {}
                Ok(Err(e)) => warn!(shard = index, what, "Shard probe failed, skipping: {}", e),
                Err(_) => warn!(
                    shard = index,
                    what,
                    timeout_ms = self.probe_timeout.as_millis() as u64,
                    "Shard probe timed out, skipping"
                ),
            }
        }

        debug!(what, "Scatter lookup found nothing");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    fn router(slots: Vec<Option<&'static str>>) -> ShardRouter<&'static str> {
        ShardRouter::new(ShardPool::from_handles(slots).unwrap(), Duration::from_millis(50))
    }

    fn four_shards() -> ShardRouter<&'static str> {
        router(vec![Some("s0"), Some("s1"), Some("s2"), Some("s3")])
    }

    #[test]
    fn index_is_sum_of_code_units() {
        assert_eq!(shard_index("abc", 4), (97 + 98 + 99) % 4);
        assert_eq!(shard_index("é", 4), 233 % 4);
        // Surrogate pair counts as two code units.
        assert_eq!(shard_index("😀", 4), (0xD83D + 0xDE00) % 4);
    }

    #[test]
    fn routing_is_stable() {
        let router = four_shards();
        let id = Uuid::new_v4().to_string();
        let first = router.client_for(&id);
        for _ in 0..100 {
            assert_eq!(router.client_for(&id), first);
        }
    }

    #[test]
    fn uuids_spread_evenly() {
        let router = four_shards();
        let mut buckets: HashMap<usize, usize> = HashMap::new();
        for _ in 0..10_000 {
            let (index, _) = router.client_for(&Uuid::new_v4().to_string());
            *buckets.entry(index).or_default() += 1;
        }
        for index in 0..4 {
            let count = buckets.get(&index).copied().unwrap_or(0);
            assert!((2_250..=2_750).contains(&count), "shard {} got {}", index, count);
        }
    }

    #[test]
    fn unconfigured_slot_falls_back_to_primary() {
        let router = router(vec![Some("s0"), None, Some("s2"), Some("s3")]);
        // "a" = 97, 97 % 4 = 1
        assert_eq!(router.client_for("a"), (0, &"s0"));
        // "b" = 98, 98 % 4 = 2
        assert_eq!(router.client_for("b"), (2, &"s2"));
    }

    #[test]
    fn empty_id_resolves_to_primary() {
        assert_eq!(four_shards().client_for(""), (0, &"s0"));
    }

    #[tokio::test]
    async fn scatter_returns_first_hit_in_order() {
        let router = four_shards();
        let probed = AtomicUsize::new(0);

        let hit = router
            .scatter_find("workspace", |index, handle| {
                probed.fetch_add(1, Ordering::SeqCst);
                async move {
                    Ok::<_, String>(if index >= 2 { Some(handle.to_string()) } else { None })
                }
            })
            .await;

        assert_eq!(hit, Some(("s2".to_string(), 2)));
        assert_eq!(probed.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn scatter_miss_is_none() {
        let hit = four_shards()
            .scatter_find("workspace", |_, _| async { Ok::<Option<u32>, String>(None) })
            .await;
        assert_eq!(hit, None);
    }

    #[tokio::test]
    async fn scatter_skips_unreachable_shards() {
        let hit = four_shards()
            .scatter_find("workspace", |index, _| async move {
                match index {
                    0 | 1 => Err("connection refused".to_string()),
                    3 => Ok(Some(index)),
                    _ => Ok(None),
                }
            })
            .await;
        assert_eq!(hit, Some((3, 3)));
    }

    #[tokio::test]
    async fn scatter_bounds_slow_shards() {
        let started = std::time::Instant::now();
        let hit = four_shards()
            .scatter_find("workspace", |index, _| async move {
                if index == 0 {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                }
                Ok::<_, String>(if index == 1 { Some("found") } else { None })
            })
            .await;

        assert_eq!(hit, Some(("found", 1)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
