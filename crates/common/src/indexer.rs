use std::time::Duration;

/// Already-indexed blocks re-scanned on every resumption so a chain
/// reorganization inside this depth is corrected by the idempotent replay.
pub const REORG_BUFFER_BLOCKS: u64 = 10;

/// Cached block timestamps are dropped once they fall this far behind head.
pub const TIMESTAMP_CACHE_DEPTH: u64 = 1_000;

/// Upper bound on the exponential retry backoff.
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Batch size recovers toward the configured initial value by this factor
/// after a successful batch.
pub const BATCH_GROWTH_NUM: u64 = 3;
pub const BATCH_GROWTH_DEN: u64 = 2;

/// The health check reports the indexer as stalled after this long without
/// a checkpoint update.
pub const STALE_AFTER: Duration = Duration::from_secs(5 * 60);

/// Raw events are recorded with this type until decoding succeeds.
pub const EVENT_TYPE_UNKNOWN: &str = "unknown";
