//! Derived read views for the API. All of these are computable by scanning
//! the event tables; the aggregate tables are only a shortcut.

use eyre::Result;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};

use crate::{
    client::DbClient,
    entities::{burn_nfts, term_stats, wallet_stats},
};

impl DbClient {
    pub async fn active_locks(&self, chain_id: i64, limit: u64) -> Result<Vec<burn_nfts::Model>> {
        let locks = burn_nfts::Entity::find()
            .filter(burn_nfts::Column::ChainId.eq(chain_id))
            .filter(burn_nfts::Column::Claimed.eq(false))
            .filter(burn_nfts::Column::Burned.eq(false))
            .order_by_asc(burn_nfts::Column::MaturityTimestamp)
            .limit(limit)
            .all(&self.conn)
            .await?;
        Ok(locks)
    }

    pub async fn early_burn_locks(
        &self,
        chain_id: i64,
        limit: u64,
    ) -> Result<Vec<burn_nfts::Model>> {
        let locks = burn_nfts::Entity::find()
            .filter(burn_nfts::Column::ChainId.eq(chain_id))
            .filter(burn_nfts::Column::EarlyBurn.eq(true))
            .order_by_desc(burn_nfts::Column::BurnedAt)
            .limit(limit)
            .all(&self.conn)
            .await?;
        Ok(locks)
    }

    pub async fn wallet_stats(
        &self,
        wallet: &str,
        chain_id: i64,
    ) -> Result<Option<wallet_stats::Model>> {
        let stats = wallet_stats::Entity::find()
            .filter(wallet_stats::Column::Wallet.eq(wallet))
            .filter(wallet_stats::Column::ChainId.eq(chain_id))
            .one(&self.conn)
            .await?;
        Ok(stats)
    }

    pub async fn term_stats(&self, chain_id: i64) -> Result<Vec<term_stats::Model>> {
        let stats = term_stats::Entity::find()
            .filter(term_stats::Column::ChainId.eq(chain_id))
            .order_by_asc(term_stats::Column::TermDays)
            .all(&self.conn)
            .await?;
        Ok(stats)
    }

    pub async fn top_burners(
        &self,
        chain_id: i64,
        limit: u64,
    ) -> Result<Vec<wallet_stats::Model>> {
        let wallets = wallet_stats::Entity::find()
            .filter(wallet_stats::Column::ChainId.eq(chain_id))
            .order_by_desc(wallet_stats::Column::TotalXenBurned)
            .limit(limit)
            .all(&self.conn)
            .await?;
        Ok(wallets)
    }
}
