use chrono::{DateTime, Utc};
use database::entities::{burn_nfts, indexer_metrics, term_stats, wallet_stats};
use serde::{Deserialize, Serialize};

/// Numeric amounts are serialized as decimal strings: token amounts go up
/// to 2^256 and JSON numbers stop being exact well before that.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LockResponse {
    pub token_id: String,
    pub user: String,
    pub xen_amount: String,
    pub term_days: i64,
    pub created_at: DateTime<Utc>,
    pub maturity_timestamp: DateTime<Utc>,
    pub claimed: bool,
    pub burned: bool,
    pub early_burn: bool,
    pub burned_at: Option<DateTime<Utc>>,
    pub tx_hash: String,
}

impl From<burn_nfts::Model> for LockResponse {
    fn from(lock: burn_nfts::Model) -> Self {
        Self {
            token_id: lock.token_id.to_string(),
            user: lock.user,
            xen_amount: lock.xen_amount.to_string(),
            term_days: lock.term_days,
            created_at: lock.timestamp,
            maturity_timestamp: lock.maturity_timestamp,
            claimed: lock.claimed,
            burned: lock.burned,
            early_burn: lock.early_burn,
            burned_at: lock.burned_at,
            tx_hash: lock.tx_hash,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletStatsResponse {
    pub wallet: String,
    pub total_xen_burned: String,
    pub total_xburn_burned: String,
    pub total_xburn_claimed: String,
    pub total_locks: i64,
    pub active_locks: i64,
    pub completed_locks: i64,
    pub early_unlocks: i64,
    pub updated_at: DateTime<Utc>,
}

impl From<wallet_stats::Model> for WalletStatsResponse {
    fn from(stats: wallet_stats::Model) -> Self {
        Self {
            wallet: stats.wallet,
            total_xen_burned: stats.total_xen_burned.to_string(),
            total_xburn_burned: stats.total_xburn_burned.to_string(),
            total_xburn_claimed: stats.total_xburn_claimed.to_string(),
            total_locks: stats.total_locks,
            active_locks: stats.active_locks,
            completed_locks: stats.completed_locks,
            early_unlocks: stats.early_unlocks,
            updated_at: stats.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TermStatsResponse {
    pub term_days: i64,
    pub total_locks: i64,
    pub active_locks: i64,
    pub total_xen_locked: String,
}

impl From<term_stats::Model> for TermStatsResponse {
    fn from(stats: term_stats::Model) -> Self {
        Self {
            term_days: stats.term_days,
            total_locks: stats.total_locks,
            active_locks: stats.active_locks,
            total_xen_locked: stats.total_xen_locked.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub block_number: i64,
    pub batch_size: i32,
    pub events_processed: i32,
    pub batch_time_ms: i64,
    pub memory_usage_mb: f64,
    pub timestamp: DateTime<Utc>,
}

impl From<indexer_metrics::Model> for MetricsSnapshot {
    fn from(row: indexer_metrics::Model) -> Self {
        Self {
            block_number: row.block_number,
            batch_size: row.batch_size,
            events_processed: row.events_processed,
            batch_time_ms: row.batch_time_ms,
            memory_usage_mb: row.memory_usage_mb,
            timestamp: row.timestamp,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub chain_id: i64,
    pub chain_name: String,
    pub last_indexed_block: Option<i64>,
    pub last_indexed_at: Option<DateTime<Utc>>,
    pub metrics: Option<MetricsSnapshot>,
}

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<u64>,
}
