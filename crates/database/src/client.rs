use chrono::Utc;
use eyre::Result;
use sea_orm::{
    sea_query::OnConflict, ActiveValue::Set, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::error;

use crate::entities::{indexer_metrics, indexer_state};

#[derive(Debug)]
pub struct DbClient {
    pub conn: DatabaseConnection,
}

impl DbClient {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn begin(&self) -> Result<DatabaseTransaction> {
        Ok(self.conn.begin().await?)
    }

    pub async fn get_checkpoint(&self, chain_id: i64) -> Result<Option<indexer_state::Model>> {
        let state = indexer_state::Entity::find_by_id(chain_id)
            .one(&self.conn)
            .await?;
        Ok(state)
    }

    /// Advances the per-chain watermark. Issued only after the batch
    /// transaction has committed, so a crash in between re-processes the same
    /// window and the idempotent inserts absorb the duplication.
    pub async fn upsert_checkpoint(
        &self,
        chain_id: i64,
        last_indexed_block: i64,
        batch_size: i32,
        retry_count: i32,
    ) -> Result<()> {
        let model = indexer_state::ActiveModel {
            chain_id: Set(chain_id),
            last_indexed_block: Set(last_indexed_block),
            last_indexed_at: Set(Utc::now()),
            batch_size: Set(batch_size),
            retry_count: Set(retry_count),
        };
        indexer_state::Entity::insert(model)
            .on_conflict(
                OnConflict::column(indexer_state::Column::ChainId)
                    .update_columns([
                        indexer_state::Column::LastIndexedBlock,
                        indexer_state::Column::LastIndexedAt,
                        indexer_state::Column::BatchSize,
                        indexer_state::Column::RetryCount,
                    ])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await
            .map_err(|e| {
                error!("Failed to upsert indexer state: {:?}", e);
                eyre::eyre!("Failed to upsert indexer state: {:?}", e)
            })?;

        Ok(())
    }

    pub async fn insert_metrics(
        &self,
        model: indexer_metrics::ActiveModel,
        txn: &DatabaseTransaction,
    ) -> Result<()> {
        indexer_metrics::Entity::insert(model).exec(txn).await?;
        Ok(())
    }

    pub async fn latest_metrics(&self, chain_id: i64) -> Result<Option<indexer_metrics::Model>> {
        let row = indexer_metrics::Entity::find()
            .filter(indexer_metrics::Column::ChainId.eq(chain_id))
            .order_by_desc(indexer_metrics::Column::Id)
            .one(&self.conn)
            .await?;
        Ok(row)
    }
}
