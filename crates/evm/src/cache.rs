use std::collections::HashMap;

use chrono::{DateTime, Utc};
use common::indexer::TIMESTAMP_CACHE_DEPTH;
use eyre::{eyre, Result};

use crate::provider::EvmProvider;

/// Block-number -> timestamp memo. Owned by the scheduler loop, so there is
/// a single writer and no locking. Eviction is an approximation tied to the
/// current head, not LRU: anything deeper than [`TIMESTAMP_CACHE_DEPTH`]
/// blocks behind head is dropped on the next idle pass.
#[derive(Debug, Default)]
pub struct BlockTimestampCache {
    inner: HashMap<u64, DateTime<Utc>>,
}

impl BlockTimestampCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches timestamps for any of `blocks` not already cached.
    pub async fn ensure(
        &mut self,
        provider: &EvmProvider,
        blocks: impl IntoIterator<Item = u64>,
    ) -> Result<()> {
        for block in blocks {
            if self.inner.contains_key(&block) {
                continue;
            }
            let secs = provider.get_block_timestamp(block).await?;
            let ts = DateTime::<Utc>::from_timestamp(secs as i64, 0)
                .ok_or_else(|| eyre!("Block {} has invalid timestamp {}", block, secs))?;
            self.inner.insert(block, ts);
        }
        Ok(())
    }

    pub fn get(&self, block: u64) -> Option<DateTime<Utc>> {
        self.inner.get(&block).copied()
    }

    pub fn insert(&mut self, block: u64, ts: DateTime<Utc>) {
        self.inner.insert(block, ts);
    }

    pub fn prune(&mut self, head: u64) {
        let cutoff = head.saturating_sub(TIMESTAMP_CACHE_DEPTH);
        self.inner.retain(|block, _| *block >= cutoff);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn prune_drops_blocks_behind_the_cache_depth() {
        let mut cache = BlockTimestampCache::new();
        cache.insert(100, ts(1));
        cache.insert(5_000, ts(2));
        cache.insert(9_500, ts(3));

        cache.prune(10_000);

        assert_eq!(cache.get(100), None);
        assert_eq!(cache.get(5_000), None);
        assert_eq!(cache.get(9_500), Some(ts(3)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn prune_near_genesis_keeps_everything() {
        let mut cache = BlockTimestampCache::new();
        cache.insert(0, ts(1));
        cache.insert(50, ts(2));

        cache.prune(100);

        assert_eq!(cache.len(), 2);
    }
}
