// ============================================================================
// Tenant Infrastructure - Shard Pool
// File: crates/tenant-infrastructure/src/shard/pool.rs
// ============================================================================
//! One long-lived handle per configured shard slot

use sqlx::PgPool;
use tenant_shared::config::ShardSettings;
use tenant_shared::constants::PRIMARY_SHARD;
use tracing::info;

use crate::database::create_pool;
use crate::shard::error::ShardError;

/// Fixed-size list of shard slots. A secondary slot is `None` when its URL
/// is left blank; the primary slot always holds a handle.
#[derive(Debug, Clone)]
pub struct ShardPool<H> {
    primary: H,
    secondaries: Vec<Option<H>>,
}

impl<H> ShardPool<H> {
    pub fn from_handles(slots: Vec<Option<H>>) -> Result<Self, ShardError> {
        let mut slots = slots.into_iter();
        match slots.next() {
            None => Err(ShardError::NoShardsConfigured("shard list is empty".to_string())),
            Some(None) => Err(ShardError::NoShardsConfigured(format!(
                "primary shard {} has no connection configured",
                PRIMARY_SHARD
            ))),
            Some(Some(primary)) => Ok(Self {
                primary,
                secondaries: slots.collect(),
            }),
        }
    }

    /// Number of slots, configured or not. This is the routing modulus.
    /// Never zero: a pool always holds its primary.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.secondaries.len() + 1
    }

    pub fn primary(&self) -> &H {
        &self.primary
    }

    pub fn get(&self, index: usize) -> Option<&H> {
        if index == PRIMARY_SHARD {
            return Some(&self.primary);
        }
        self.secondaries.get(index - 1).and_then(Option::as_ref)
    }

    /// Configured slots in fixed index order.
    pub fn configured(&self) -> impl Iterator<Item = (usize, &H)> {
        std::iter::once((PRIMARY_SHARD, &self.primary)).chain(
            self.secondaries
                .iter()
                .enumerate()
                .filter_map(|(offset, slot)| slot.as_ref().map(|h| (offset + 1, h))),
        )
    }
}

impl ShardPool<PgPool> {
    /// Build lazy pools for every non-blank URL. Connections are opened on
    /// first use, so an unreachable shard does not block startup.
    pub fn init(settings: &ShardSettings) -> Result<Self, ShardError> {
        let mut slots = Vec::with_capacity(settings.urls.len());

        for (index, url) in settings.urls.iter().enumerate() {
            let url = url.trim();
            if url.is_empty() {
                info!(shard = index, "Shard slot left unconfigured");
                slots.push(None);
                continue;
            }

            let pool = create_pool(url, settings.max_connections, settings.acquire_timeout_ms).map_err(|e| {
                ShardError::InvalidShard {
                    shard: index,
                    reason: e.to_string(),
                }
            })?;
            slots.push(Some(pool));
        }

        let pool = Self::from_handles(slots)?;
        info!(
            slots = pool.len(),
            configured = pool.configured().count(),
            "Shard pool initialized"
        );
        Ok(pool)
    }

    pub async fn shutdown(&self) {
        for (index, pool) in self.configured() {
            pool.close().await;
            info!(shard = index, "Shard pool closed");
        }
    }
}
