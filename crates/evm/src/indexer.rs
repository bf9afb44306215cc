//! Checkpointed batch scheduler. One sequential loop per chain: plan a block
//! window behind the reorg buffer, fetch both contracts' logs, apply them in
//! a single transaction, then advance the checkpoint. Later events depend on
//! earlier lock state, so there is no intra-batch parallelism.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use alloy::primitives::Address;
use chrono::Utc;
use common::{
    config::IndexerConfig,
    indexer::{BATCH_GROWTH_DEN, BATCH_GROWTH_NUM, MAX_BACKOFF, REORG_BUFFER_BLOCKS},
};
use database::{client::DbClient, entities::indexer_metrics};
use eyre::{eyre, Result};
use sea_orm::ActiveValue::Set;
use sysinfo::{ProcessExt, System, SystemExt};
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::{
    cache::BlockTimestampCache,
    error::IndexError,
    parser::{EventParser, MINTER_EVENT_SIGNATURES, NFT_EVENT_SIGNATURES},
    processor::EventProcessor,
    provider::EvmProvider,
};

/// What one committed batch did, for logging and the metrics row.
#[derive(Debug, Clone, Copy)]
pub struct BatchReport {
    pub events_processed: i32,
    pub batch_time_ms: i64,
}

pub struct BurnIndexer {
    provider: EvmProvider,
    processor: EventProcessor,
    db: Arc<DbClient>,
    config: IndexerConfig,
    minter: Address,
    nft: Address,
    timestamps: BlockTimestampCache,
    batch_size: u64,
    retry_count: u32,
}

impl BurnIndexer {
    /// Fails only on unusable configuration or when no RPC endpoint answers.
    pub async fn new(config: IndexerConfig, db: Arc<DbClient>) -> Result<Self> {
        let minter: Address = config
            .contracts
            .xburn_minter
            .parse()
            .map_err(|e| eyre!("Invalid XBurnMinter address: {}", e))?;
        let nft: Address = config
            .contracts
            .xburn_nft
            .parse()
            .map_err(|e| eyre!("Invalid XBurnNFT address: {}", e))?;

        let provider =
            EvmProvider::connect(&config.chain.rpc_endpoints(), config.chain.chain_id).await?;

        let processor = EventProcessor::new(
            db.clone(),
            EventParser::new(minter, nft),
            config.chain.chain_id,
        );

        let batch_size = config.chain.batch_size.max(1);
        Ok(Self {
            provider,
            processor,
            db,
            config,
            minter,
            nft,
            timestamps: BlockTimestampCache::new(),
            batch_size,
            retry_count: 0,
        })
    }

    pub async fn run(&mut self, mut stop: watch::Receiver<bool>) -> Result<()> {
        let chain_id = self.config.chain.chain_id;
        let poll_interval = Duration::from_millis(self.config.chain.poll_interval_ms);

        let mut checkpoint = match self.db.get_checkpoint(chain_id).await? {
            Some(state) => {
                self.batch_size = u64::try_from(state.batch_size).unwrap_or(1).max(1);
                info!(
                    chain_id,
                    last_indexed_block = state.last_indexed_block,
                    batch_size = self.batch_size,
                    "Resuming from checkpoint"
                );
                u64::try_from(state.last_indexed_block).unwrap_or(self.config.chain.start_block)
            }
            None => {
                let start = self.config.chain.start_block;
                self.db
                    .upsert_checkpoint(chain_id, start as i64, self.batch_size as i32, 0)
                    .await?;
                info!(chain_id, start_block = start, "Starting from configured block");
                start
            }
        };

        while !*stop.borrow() {
            let head = match self.provider.get_block_number().await {
                Ok(head) => head,
                Err(e) => {
                    warn!(chain_id, "Failed to fetch chain head: {}", e);
                    sleep_or_stop(&mut stop, poll_interval).await;
                    continue;
                }
            };

            let Some((from, to)) = plan_window(
                checkpoint,
                head,
                self.batch_size,
                self.config.chain.start_block,
            ) else {
                self.timestamps.prune(head);
                sleep_or_stop(&mut stop, poll_interval).await;
                continue;
            };

            match self.index_window(from, to).await {
                Ok(report) => {
                    checkpoint = to;
                    self.retry_count = 0;
                    self.batch_size = grow_batch_size(self.batch_size, self.config.chain.batch_size);
                    self.db
                        .upsert_checkpoint(chain_id, to as i64, self.batch_size as i32, 0)
                        .await?;
                    info!(
                        chain_id,
                        from,
                        to,
                        head,
                        events = report.events_processed,
                        batch_time_ms = report.batch_time_ms,
                        "Indexed batch"
                    );
                }
                Err(e) => {
                    self.retry_count += 1;
                    if self.retry_count < self.config.chain.max_retries {
                        let delay =
                            backoff_delay(self.config.chain.retry_base_delay_ms, self.retry_count);
                        warn!(
                            chain_id,
                            from,
                            to,
                            attempt = self.retry_count,
                            delay_ms = delay.as_millis() as u64,
                            "Batch failed, retrying: {}",
                            e
                        );
                        sleep_or_stop(&mut stop, delay).await;
                    } else {
                        // Skipping loses the window's events. The raw tables
                        // stay consistent; a lowered start_block re-ingests.
                        error!(
                            chain_id,
                            from,
                            to,
                            attempts = self.retry_count,
                            "Batch failed repeatedly, skipping window: {}",
                            e
                        );
                        checkpoint = to;
                        self.retry_count = 0;
                        self.db
                            .upsert_checkpoint(chain_id, to as i64, self.batch_size as i32, 0)
                            .await?;
                    }
                }
            }
        }

        info!(chain_id, "Indexer stopped");
        Ok(())
    }

    /// Fetch, order, and apply one window atomically. The metrics row rides
    /// in the same transaction, one per batch even when the window is empty.
    async fn index_window(&mut self, from: u64, to: u64) -> Result<BatchReport, IndexError> {
        let started = Instant::now();
        let chain_id = self.config.chain.chain_id;

        let mut logs = self
            .provider
            .get_logs(self.minter, &MINTER_EVENT_SIGNATURES, from, to)
            .await
            .map_err(IndexError::Transport)?;
        let nft_logs = self
            .provider
            .get_logs(self.nft, &NFT_EVENT_SIGNATURES, from, to)
            .await
            .map_err(IndexError::Transport)?;
        logs.extend(nft_logs);

        // eth_getLogs gives no cross-contract order guarantee.
        logs.sort_by_key(|log| (log.block_number, log.log_index));

        let blocks: Vec<u64> = logs.iter().filter_map(|log| log.block_number).collect();
        self.timestamps
            .ensure(&self.provider, blocks)
            .await
            .map_err(IndexError::Transport)?;

        let txn = self.db.begin().await.map_err(IndexError::Persistence)?;

        let mut events_processed = 0i32;
        for log in &logs {
            let Some(block) = log.block_number else {
                warn!(chain_id, "Skipping log without block number");
                continue;
            };
            let timestamp = self
                .timestamps
                .get(block)
                .ok_or_else(|| IndexError::Transport(eyre!("No timestamp for block {}", block)))?;
            self.processor
                .process_log(log, timestamp, &txn)
                .await
                .map_err(IndexError::Persistence)?;
            events_processed += 1;
        }

        let batch_time_ms = started.elapsed().as_millis() as i64;
        let metrics = indexer_metrics::ActiveModel {
            chain_id: Set(chain_id),
            block_number: Set(to as i64),
            batch_size: Set((to - from + 1) as i32),
            events_processed: Set(events_processed),
            batch_time_ms: Set(batch_time_ms),
            memory_usage_mb: Set(process_memory_mb()),
            timestamp: Set(Utc::now()),
            ..Default::default()
        };
        self.db
            .insert_metrics(metrics, &txn)
            .await
            .map_err(IndexError::Persistence)?;

        txn.commit()
            .await
            .map_err(|e| IndexError::Persistence(e.into()))?;

        Ok(BatchReport {
            events_processed,
            batch_time_ms,
        })
    }
}

async fn sleep_or_stop(stop: &mut watch::Receiver<bool>, duration: Duration) {
    tokio::select! {
        _ = tokio::time::sleep(duration) => {}
        _ = stop.changed() => {}
    }
}

/// Next window to scan, or `None` when caught up. The lower edge backs up
/// [`REORG_BUFFER_BLOCKS`] behind the checkpoint but never before the
/// configured start block. The upper edge always clears the checkpoint by at
/// least one block, so the stored checkpoint stays monotonic even when the
/// batch size is smaller than the reorg buffer.
pub fn plan_window(
    checkpoint: u64,
    head: u64,
    batch_size: u64,
    start_block: u64,
) -> Option<(u64, u64)> {
    if checkpoint >= head {
        return None;
    }
    let from = (checkpoint + 1)
        .saturating_sub(REORG_BUFFER_BLOCKS)
        .max(start_block);
    let to = from
        .saturating_add(batch_size.max(1) - 1)
        .min(head)
        .max(checkpoint + 1);
    Some((from, to))
}

/// Recovery after a successful batch: grow by 3/2 (always at least one
/// block) up to the configured initial size. There is no shrink path.
pub fn grow_batch_size(current: u64, initial: u64) -> u64 {
    ((current.saturating_mul(BATCH_GROWTH_NUM) / BATCH_GROWTH_DEN).max(current + 1)).min(initial)
}

pub fn backoff_delay(base_ms: u64, attempt: u32) -> Duration {
    let exp = 2u64.saturating_pow(attempt);
    Duration::from_millis(base_ms.saturating_mul(exp)).min(MAX_BACKOFF)
}

fn process_memory_mb() -> f64 {
    let Ok(pid) = sysinfo::get_current_pid() else {
        return 0.0;
    };
    let mut sys = System::new();
    if !sys.refresh_process(pid) {
        return 0.0;
    }
    sys.process(pid)
        .map(|p| p.memory() as f64 / (1024.0 * 1024.0))
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_backs_up_the_reorg_buffer() {
        assert_eq!(plan_window(100, 700, 500, 0), Some((91, 590)));
    }

    #[test]
    fn window_never_starts_before_the_start_block() {
        assert_eq!(plan_window(100, 700, 500, 95), Some((95, 594)));
        // First run: checkpoint sits at the start block itself.
        assert_eq!(plan_window(200, 210, 500, 200), Some((200, 210)));
    }

    #[test]
    fn window_is_clamped_to_head_and_none_when_caught_up() {
        assert_eq!(plan_window(100, 105, 500, 0), Some((91, 105)));
        assert_eq!(plan_window(700, 700, 500, 0), None);
        assert_eq!(plan_window(700, 650, 500, 0), None);
    }

    #[test]
    fn window_near_genesis_does_not_underflow() {
        assert_eq!(plan_window(3, 100, 10, 0), Some((0, 9)));
    }

    #[test]
    fn tiny_batches_still_advance_the_checkpoint() {
        // A batch smaller than the reorg buffer would otherwise end below
        // the checkpoint and walk it backwards.
        assert_eq!(plan_window(100, 700, 5, 0), Some((91, 101)));
        assert_eq!(plan_window(100, 700, 1, 0), Some((91, 101)));
        // Near head the clamp cannot push past it.
        assert_eq!(plan_window(699, 700, 5, 0), Some((690, 700)));
    }

    #[test]
    fn batch_size_recovers_toward_the_initial_value() {
        assert_eq!(grow_batch_size(100, 500), 150);
        assert_eq!(grow_batch_size(400, 500), 500);
        assert_eq!(grow_batch_size(500, 500), 500);
        // Growth makes progress even from a batch of one block.
        assert_eq!(grow_batch_size(1, 500), 2);
    }

    #[test]
    fn backoff_doubles_and_is_capped() {
        assert_eq!(backoff_delay(1_000, 1), Duration::from_secs(2));
        assert_eq!(backoff_delay(1_000, 2), Duration::from_secs(4));
        assert_eq!(backoff_delay(1_000, 4), Duration::from_secs(16));
        assert_eq!(backoff_delay(1_000, 5), MAX_BACKOFF);
        assert_eq!(backoff_delay(1_000, 60), MAX_BACKOFF);
    }
}
