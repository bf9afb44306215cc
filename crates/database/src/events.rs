//! Idempotent inserts for the append-only event tables. Every insert reports
//! whether the row actually landed so callers can gate derived-state updates
//! on it (replaying a window must never double-count).

use eyre::Result;
use sea_orm::{sea_query::OnConflict, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter};

use crate::{
    client::DbClient,
    entities::{nft_transfers, raw_events, xburn_burns, xburn_claims, xen_burns},
    insert_outcome,
};

impl DbClient {
    pub async fn insert_raw_event(
        &self,
        model: raw_events::ActiveModel,
        txn: &DatabaseTransaction,
    ) -> Result<bool> {
        let res = raw_events::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    raw_events::Column::TxHash,
                    raw_events::Column::LogIndex,
                    raw_events::Column::ChainId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec(txn)
            .await;
        insert_outcome(res)
    }

    /// Back-fills the one mutable column of a raw event once decoding
    /// succeeded. Idempotent: re-running the batch sets the same value again.
    pub async fn set_raw_event_type(
        &self,
        chain_id: i64,
        tx_hash: &str,
        log_index: i32,
        event_type: &str,
        txn: &DatabaseTransaction,
    ) -> Result<()> {
        raw_events::Entity::update_many()
            .col_expr(
                raw_events::Column::EventType,
                sea_orm::sea_query::Expr::value(event_type),
            )
            .filter(raw_events::Column::ChainId.eq(chain_id))
            .filter(raw_events::Column::TxHash.eq(tx_hash))
            .filter(raw_events::Column::LogIndex.eq(log_index))
            .exec(txn)
            .await?;
        Ok(())
    }

    pub async fn insert_xen_burn(
        &self,
        model: xen_burns::ActiveModel,
        txn: &DatabaseTransaction,
    ) -> Result<bool> {
        let res = xen_burns::Entity::insert(model)
            .on_conflict(idempotency_conflict::<xen_burns::Entity>(
                xen_burns::Column::TxHash,
                xen_burns::Column::LogIndex,
                xen_burns::Column::ChainId,
            ))
            .exec(txn)
            .await;
        insert_outcome(res)
    }

    pub async fn insert_xburn_burn(
        &self,
        model: xburn_burns::ActiveModel,
        txn: &DatabaseTransaction,
    ) -> Result<bool> {
        let res = xburn_burns::Entity::insert(model)
            .on_conflict(idempotency_conflict::<xburn_burns::Entity>(
                xburn_burns::Column::TxHash,
                xburn_burns::Column::LogIndex,
                xburn_burns::Column::ChainId,
            ))
            .exec(txn)
            .await;
        insert_outcome(res)
    }

    pub async fn insert_claim(
        &self,
        model: xburn_claims::ActiveModel,
        txn: &DatabaseTransaction,
    ) -> Result<bool> {
        let res = xburn_claims::Entity::insert(model)
            .on_conflict(idempotency_conflict::<xburn_claims::Entity>(
                xburn_claims::Column::TxHash,
                xburn_claims::Column::LogIndex,
                xburn_claims::Column::ChainId,
            ))
            .exec(txn)
            .await;
        insert_outcome(res)
    }

    pub async fn insert_transfer(
        &self,
        model: nft_transfers::ActiveModel,
        txn: &DatabaseTransaction,
    ) -> Result<bool> {
        let res = nft_transfers::Entity::insert(model)
            .on_conflict(idempotency_conflict::<nft_transfers::Entity>(
                nft_transfers::Column::TxHash,
                nft_transfers::Column::LogIndex,
                nft_transfers::Column::ChainId,
            ))
            .exec(txn)
            .await;
        insert_outcome(res)
    }
}

fn idempotency_conflict<E: EntityTrait>(
    tx_hash: E::Column,
    log_index: E::Column,
    chain_id: E::Column,
) -> OnConflict {
    OnConflict::columns([tx_hash, log_index, chain_id])
        .do_nothing()
        .to_owned()
}
