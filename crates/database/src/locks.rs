//! BurnLock state machine writes. Transitions only move forward: the SQL
//! guards mirror the handler checks so a lock can never un-claim, un-burn,
//! or change owner after either terminal flag is set.

use bigdecimal::BigDecimal;
use eyre::Result;
use sea_orm::{
    sea_query::{Expr, OnConflict},
    ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter,
};

use crate::{client::DbClient, entities::burn_nfts, insert_outcome};

impl DbClient {
    pub async fn find_burn_nft(
        &self,
        token_id: &BigDecimal,
        chain_id: i64,
        txn: &DatabaseTransaction,
    ) -> Result<Option<burn_nfts::Model>> {
        let lock = burn_nfts::Entity::find()
            .filter(burn_nfts::Column::TokenId.eq(token_id.clone()))
            .filter(burn_nfts::Column::ChainId.eq(chain_id))
            .one(txn)
            .await?;
        Ok(lock)
    }

    /// A lock is created exactly once per `(token_id, chain_id)`; replays of
    /// the mint log are no-ops.
    pub async fn insert_burn_nft(
        &self,
        model: burn_nfts::ActiveModel,
        txn: &DatabaseTransaction,
    ) -> Result<bool> {
        let res = burn_nfts::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([burn_nfts::Column::TokenId, burn_nfts::Column::ChainId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec(txn)
            .await;
        insert_outcome(res)
    }

    pub async fn mark_claimed(
        &self,
        lock_id: i64,
        claimed_at: chrono::DateTime<chrono::Utc>,
        claim_tx_hash: &str,
        txn: &DatabaseTransaction,
    ) -> Result<bool> {
        let res = burn_nfts::Entity::update_many()
            .col_expr(burn_nfts::Column::Claimed, Expr::value(true))
            .col_expr(burn_nfts::Column::ClaimedAt, Expr::value(claimed_at))
            .col_expr(burn_nfts::Column::ClaimTxHash, Expr::value(claim_tx_hash))
            .filter(burn_nfts::Column::Id.eq(lock_id))
            .filter(burn_nfts::Column::Claimed.eq(false))
            .filter(burn_nfts::Column::Burned.eq(false))
            .exec(txn)
            .await?;
        Ok(res.rows_affected > 0)
    }

    pub async fn mark_burned(
        &self,
        lock_id: i64,
        burned_at: chrono::DateTime<chrono::Utc>,
        burn_tx_hash: &str,
        early_burn: bool,
        txn: &DatabaseTransaction,
    ) -> Result<bool> {
        let res = burn_nfts::Entity::update_many()
            .col_expr(burn_nfts::Column::Burned, Expr::value(true))
            .col_expr(burn_nfts::Column::BurnedAt, Expr::value(burned_at))
            .col_expr(burn_nfts::Column::BurnTxHash, Expr::value(burn_tx_hash))
            .col_expr(burn_nfts::Column::EarlyBurn, Expr::value(early_burn))
            .filter(burn_nfts::Column::Id.eq(lock_id))
            .filter(burn_nfts::Column::Burned.eq(false))
            .exec(txn)
            .await?;
        Ok(res.rows_affected > 0)
    }

    /// Ownership only changes while the lock is live.
    pub async fn set_lock_owner(
        &self,
        lock_id: i64,
        new_owner: &str,
        txn: &DatabaseTransaction,
    ) -> Result<bool> {
        let res = burn_nfts::Entity::update_many()
            .col_expr(burn_nfts::Column::User, Expr::value(new_owner))
            .filter(burn_nfts::Column::Id.eq(lock_id))
            .filter(burn_nfts::Column::Claimed.eq(false))
            .filter(burn_nfts::Column::Burned.eq(false))
            .exec(txn)
            .await?;
        Ok(res.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    use super::*;

    fn client(exec_results: Vec<MockExecResult>) -> DbClient {
        DbClient::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results(exec_results)
                .into_connection(),
        )
    }

    fn hit() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }
    }

    fn miss() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }
    }

    #[tokio::test]
    async fn mark_claimed_reports_whether_the_guard_matched() {
        let db = client(vec![hit(), miss()]);
        let txn = db.begin().await.unwrap();
        assert!(db.mark_claimed(1, Utc::now(), "0xaa", &txn).await.unwrap());
        assert!(!db.mark_claimed(1, Utc::now(), "0xaa", &txn).await.unwrap());
        txn.commit().await.unwrap();

        // The transition is guarded in SQL, not just by the caller.
        let log = db
            .conn
            .into_transaction_log()
            .iter()
            .flat_map(|txn| txn.statements())
            .map(|stmt| format!("{} {:?}", stmt.sql, stmt.values))
            .collect::<Vec<_>>()
            .join("\n");
        assert!(log.contains(r#""claimed""#));
        assert!(log.contains(r#""burned""#));
    }

    #[tokio::test]
    async fn mark_burned_reports_whether_the_guard_matched() {
        let db = client(vec![hit(), miss()]);
        let txn = db.begin().await.unwrap();
        assert!(db
            .mark_burned(1, Utc::now(), "0xbb", true, &txn)
            .await
            .unwrap());
        assert!(!db
            .mark_burned(1, Utc::now(), "0xbb", true, &txn)
            .await
            .unwrap());
        txn.commit().await.unwrap();

        let log = db
            .conn
            .into_transaction_log()
            .iter()
            .flat_map(|txn| txn.statements())
            .map(|stmt| format!("{} {:?}", stmt.sql, stmt.values))
            .collect::<Vec<_>>()
            .join("\n");
        assert!(log.contains(r#""burned""#));
    }

    #[tokio::test]
    async fn set_lock_owner_guards_on_both_terminal_flags() {
        let db = client(vec![miss()]);
        let txn = db.begin().await.unwrap();
        assert!(!db.set_lock_owner(1, "0xcc", &txn).await.unwrap());
        txn.commit().await.unwrap();

        let log = db
            .conn
            .into_transaction_log()
            .iter()
            .flat_map(|txn| txn.statements())
            .map(|stmt| format!("{} {:?}", stmt.sql, stmt.values))
            .collect::<Vec<_>>()
            .join("\n");
        assert!(log.contains(r#""claimed""#));
        assert!(log.contains(r#""burned""#));
    }
}
