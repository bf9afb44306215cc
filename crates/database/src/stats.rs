//! Incremental wallet/term aggregate maintenance. Both tables are caches
//! over the append-only event tables; callers only apply a delta when the
//! underlying event row actually inserted, which keeps replays from
//! double-counting.

use bigdecimal::BigDecimal;
use chrono::Utc;
use eyre::Result;
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ActiveValue::Set,
    DatabaseTransaction, EntityTrait,
};

use crate::{
    client::DbClient,
    entities::{term_stats, wallet_stats},
};

#[derive(Debug, Default, Clone)]
pub struct WalletDelta {
    pub total_xen_burned: BigDecimal,
    pub total_xburn_burned: BigDecimal,
    pub total_xburn_claimed: BigDecimal,
    pub total_locks: i64,
    pub active_locks: i64,
    pub completed_locks: i64,
    pub early_unlocks: i64,
}

#[derive(Debug, Default, Clone)]
pub struct TermDelta {
    pub total_locks: i64,
    pub active_locks: i64,
    pub total_xen_locked: BigDecimal,
}

impl DbClient {
    pub async fn apply_wallet_delta(
        &self,
        wallet: &str,
        chain_id: i64,
        delta: WalletDelta,
        txn: &DatabaseTransaction,
    ) -> Result<()> {
        let now = Utc::now();
        let model = wallet_stats::ActiveModel {
            wallet: Set(wallet.to_string()),
            chain_id: Set(chain_id),
            total_xen_burned: Set(delta.total_xen_burned.clone()),
            total_xburn_burned: Set(delta.total_xburn_burned.clone()),
            total_xburn_claimed: Set(delta.total_xburn_claimed.clone()),
            total_locks: Set(delta.total_locks),
            active_locks: Set(delta.active_locks),
            completed_locks: Set(delta.completed_locks),
            early_unlocks: Set(delta.early_unlocks),
            updated_at: Set(now),
            ..Default::default()
        };

        wallet_stats::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([wallet_stats::Column::Wallet, wallet_stats::Column::ChainId])
                    .value(
                        wallet_stats::Column::TotalXenBurned,
                        Expr::col(wallet_stats::Column::TotalXenBurned)
                            .add(delta.total_xen_burned),
                    )
                    .value(
                        wallet_stats::Column::TotalXburnBurned,
                        Expr::col(wallet_stats::Column::TotalXburnBurned)
                            .add(delta.total_xburn_burned),
                    )
                    .value(
                        wallet_stats::Column::TotalXburnClaimed,
                        Expr::col(wallet_stats::Column::TotalXburnClaimed)
                            .add(delta.total_xburn_claimed),
                    )
                    .value(
                        wallet_stats::Column::TotalLocks,
                        Expr::col(wallet_stats::Column::TotalLocks).add(delta.total_locks),
                    )
                    .value(
                        wallet_stats::Column::ActiveLocks,
                        Expr::col(wallet_stats::Column::ActiveLocks).add(delta.active_locks),
                    )
                    .value(
                        wallet_stats::Column::CompletedLocks,
                        Expr::col(wallet_stats::Column::CompletedLocks).add(delta.completed_locks),
                    )
                    .value(
                        wallet_stats::Column::EarlyUnlocks,
                        Expr::col(wallet_stats::Column::EarlyUnlocks).add(delta.early_unlocks),
                    )
                    .value(wallet_stats::Column::UpdatedAt, Expr::value(now))
                    .to_owned(),
            )
            .exec(txn)
            .await?;

        Ok(())
    }

    pub async fn apply_term_delta(
        &self,
        term_days: i64,
        chain_id: i64,
        delta: TermDelta,
        txn: &DatabaseTransaction,
    ) -> Result<()> {
        let now = Utc::now();
        let model = term_stats::ActiveModel {
            term_days: Set(term_days),
            chain_id: Set(chain_id),
            total_locks: Set(delta.total_locks),
            active_locks: Set(delta.active_locks),
            total_xen_locked: Set(delta.total_xen_locked.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        term_stats::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([term_stats::Column::TermDays, term_stats::Column::ChainId])
                    .value(
                        term_stats::Column::TotalLocks,
                        Expr::col(term_stats::Column::TotalLocks).add(delta.total_locks),
                    )
                    .value(
                        term_stats::Column::ActiveLocks,
                        Expr::col(term_stats::Column::ActiveLocks).add(delta.active_locks),
                    )
                    .value(
                        term_stats::Column::TotalXenLocked,
                        Expr::col(term_stats::Column::TotalXenLocked)
                            .add(delta.total_xen_locked),
                    )
                    .value(term_stats::Column::UpdatedAt, Expr::value(now))
                    .to_owned(),
            )
            .exec(txn)
            .await?;

        Ok(())
    }
}
