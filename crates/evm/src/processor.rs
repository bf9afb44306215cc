//! Turns decoded logs into database writes. Each log is handled inside the
//! caller's batch transaction: the raw row goes in first, then the typed row,
//! then lock transitions and aggregate deltas. Aggregates only move when the
//! typed row (or lock transition) actually landed, so replaying a window is
//! a no-op end to end.

use std::{str::FromStr, sync::Arc};

use alloy::rpc::types::Log;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Duration, Utc};
use database::{
    client::DbClient,
    entities::{burn_nfts, nft_transfers, raw_events, xburn_burns, xburn_claims, xen_burns},
    stats::{TermDelta, WalletDelta},
};
use eyre::Result;
use sea_orm::{ActiveValue::Set, DatabaseTransaction};
use tracing::{debug, warn};

use common::indexer::EVENT_TYPE_UNKNOWN;

use crate::parser::{lowercase_address, BurnEvent, EventParser};

const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

/// Identity of one log within its chain, shared by every table it touches.
#[derive(Debug, Clone)]
struct LogMeta {
    tx_hash: String,
    log_index: i32,
    block_number: i64,
}

pub struct EventProcessor {
    db: Arc<DbClient>,
    parser: EventParser,
    chain_id: i64,
}

impl EventProcessor {
    pub fn new(db: Arc<DbClient>, parser: EventParser, chain_id: i64) -> Self {
        Self {
            db,
            parser,
            chain_id,
        }
    }

    /// Persists one log. Logs with missing receipt fields (pending blocks)
    /// and logs that fail to decode are skipped with a warning; only
    /// database errors propagate, failing the whole batch.
    pub async fn process_log(
        &self,
        log: &Log,
        timestamp: DateTime<Utc>,
        txn: &DatabaseTransaction,
    ) -> Result<()> {
        let meta = match self.log_meta(log) {
            Some(meta) => meta,
            None => {
                warn!(?log, "Skipping log without receipt fields");
                return Ok(());
            }
        };

        let raw = raw_events::ActiveModel {
            chain_id: Set(self.chain_id),
            block_number: Set(meta.block_number),
            tx_hash: Set(meta.tx_hash.clone()),
            log_index: Set(meta.log_index),
            address: Set(lowercase_address(log.address())),
            event_type: Set(EVENT_TYPE_UNKNOWN.to_string()),
            data: Set(serde_json::to_value(log)?),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        self.db.insert_raw_event(raw, txn).await?;

        let event = match self.parser.parse(log) {
            Ok(event) => event,
            Err(e) => {
                warn!(
                    tx_hash = %meta.tx_hash,
                    log_index = meta.log_index,
                    "Failed to decode log: {e}"
                );
                return Ok(());
            }
        };
        let kind = event.kind();

        match event {
            BurnEvent::XenBurned {
                user,
                amount,
                accumulated_amount,
                direct_burn_amount,
            } => {
                self.handle_xen_burned(
                    &meta,
                    timestamp,
                    &user,
                    &amount,
                    &accumulated_amount,
                    &direct_burn_amount,
                    txn,
                )
                .await?
            }
            BurnEvent::XburnBurned { user, amount } => {
                self.handle_xburn_burned(&meta, timestamp, &user, &amount, txn)
                    .await?
            }
            BurnEvent::LockCreated {
                user,
                token_id,
                xen_amount,
                term_days,
            } => {
                self.handle_lock_created(&meta, timestamp, &user, &token_id, &xen_amount, term_days, txn)
                    .await?
            }
            BurnEvent::LockClaimed {
                user,
                token_id,
                base_amount,
                bonus_amount,
                total_amount,
            } => {
                self.handle_lock_claimed(
                    &meta,
                    timestamp,
                    &user,
                    &token_id,
                    &base_amount,
                    &bonus_amount,
                    &total_amount,
                    txn,
                )
                .await?
            }
            BurnEvent::LockBurned { token_id } => {
                self.handle_lock_burned(&meta, timestamp, &token_id, txn)
                    .await?
            }
            BurnEvent::Transferred { from, to, token_id } => {
                self.handle_transfer(&meta, timestamp, &from, &to, &token_id, txn)
                    .await?
            }
        }

        self.db
            .set_raw_event_type(self.chain_id, &meta.tx_hash, meta.log_index, kind, txn)
            .await?;

        Ok(())
    }

    fn log_meta(&self, log: &Log) -> Option<LogMeta> {
        let tx_hash = log.transaction_hash?;
        let log_index = i32::try_from(log.log_index?).ok()?;
        let block_number = i64::try_from(log.block_number?).ok()?;
        Some(LogMeta {
            tx_hash: format!("{tx_hash:#x}"),
            log_index,
            block_number,
        })
    }

    #[allow(clippy::too_many_arguments)]
    async fn handle_xen_burned(
        &self,
        meta: &LogMeta,
        timestamp: DateTime<Utc>,
        user: &str,
        amount: &str,
        accumulated: &str,
        direct: &str,
        txn: &DatabaseTransaction,
    ) -> Result<()> {
        let amount = parse_amount(amount)?;
        let model = xen_burns::ActiveModel {
            tx_hash: Set(meta.tx_hash.clone()),
            log_index: Set(meta.log_index),
            chain_id: Set(self.chain_id),
            block_number: Set(meta.block_number),
            timestamp: Set(timestamp),
            user: Set(user.to_string()),
            amount: Set(amount.clone()),
            accumulated_amount: Set(parse_amount(accumulated)?),
            direct_burn_amount: Set(parse_amount(direct)?),
            ..Default::default()
        };
        if self.db.insert_xen_burn(model, txn).await? {
            let delta = WalletDelta {
                total_xen_burned: amount,
                ..Default::default()
            };
            self.db
                .apply_wallet_delta(user, self.chain_id, delta, txn)
                .await?;
        }
        Ok(())
    }

    async fn handle_xburn_burned(
        &self,
        meta: &LogMeta,
        timestamp: DateTime<Utc>,
        user: &str,
        amount: &str,
        txn: &DatabaseTransaction,
    ) -> Result<()> {
        let amount = parse_amount(amount)?;
        let model = xburn_burns::ActiveModel {
            tx_hash: Set(meta.tx_hash.clone()),
            log_index: Set(meta.log_index),
            chain_id: Set(self.chain_id),
            block_number: Set(meta.block_number),
            timestamp: Set(timestamp),
            user: Set(user.to_string()),
            amount: Set(amount.clone()),
            ..Default::default()
        };
        if self.db.insert_xburn_burn(model, txn).await? {
            let delta = WalletDelta {
                total_xburn_burned: amount,
                ..Default::default()
            };
            self.db
                .apply_wallet_delta(user, self.chain_id, delta, txn)
                .await?;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn handle_lock_created(
        &self,
        meta: &LogMeta,
        timestamp: DateTime<Utc>,
        user: &str,
        token_id: &str,
        xen_amount: &str,
        term_days: i64,
        txn: &DatabaseTransaction,
    ) -> Result<()> {
        let Some(maturity) = maturity_for(timestamp, term_days) else {
            warn!(
                term_days,
                tx_hash = %meta.tx_hash,
                "Lock term overflows the timestamp range, skipping"
            );
            return Ok(());
        };

        let xen_amount = parse_amount(xen_amount)?;
        let model = burn_nfts::ActiveModel {
            token_id: Set(parse_amount(token_id)?),
            tx_hash: Set(meta.tx_hash.clone()),
            log_index: Set(meta.log_index),
            chain_id: Set(self.chain_id),
            block_number: Set(meta.block_number),
            timestamp: Set(timestamp),
            user: Set(user.to_string()),
            xen_amount: Set(xen_amount.clone()),
            term_days: Set(term_days),
            maturity_timestamp: Set(maturity),
            claimed: Set(false),
            claimed_at: Set(None),
            claim_tx_hash: Set(None),
            burned: Set(false),
            burned_at: Set(None),
            burn_tx_hash: Set(None),
            early_burn: Set(false),
            ..Default::default()
        };
        if self.db.insert_burn_nft(model, txn).await? {
            let wallet_delta = WalletDelta {
                total_locks: 1,
                active_locks: 1,
                ..Default::default()
            };
            self.db
                .apply_wallet_delta(user, self.chain_id, wallet_delta, txn)
                .await?;

            let term_delta = TermDelta {
                total_locks: 1,
                active_locks: 1,
                total_xen_locked: xen_amount,
            };
            self.db
                .apply_term_delta(term_days, self.chain_id, term_delta, txn)
                .await?;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn handle_lock_claimed(
        &self,
        meta: &LogMeta,
        timestamp: DateTime<Utc>,
        user: &str,
        token_id: &str,
        base_amount: &str,
        bonus_amount: &str,
        total_amount: &str,
        txn: &DatabaseTransaction,
    ) -> Result<()> {
        let token_id = parse_amount(token_id)?;
        let lock = match self.db.find_burn_nft(&token_id, self.chain_id, txn).await? {
            Some(lock) => lock,
            None => {
                // Claim of a lock the indexer never saw minted. Likely a
                // start_block past the mint; leave the event for a backfill.
                warn!(
                    %token_id,
                    tx_hash = %meta.tx_hash,
                    "Claim for unknown lock, skipping"
                );
                return Ok(());
            }
        };

        let total = parse_amount(total_amount)?;
        let model = xburn_claims::ActiveModel {
            tx_hash: Set(meta.tx_hash.clone()),
            log_index: Set(meta.log_index),
            chain_id: Set(self.chain_id),
            block_number: Set(meta.block_number),
            timestamp: Set(timestamp),
            user_address: Set(user.to_string()),
            token_id: Set(token_id),
            base_amount: Set(parse_amount(base_amount)?),
            bonus_amount: Set(parse_amount(bonus_amount)?),
            total_amount: Set(total.clone()),
            ..Default::default()
        };
        self.db.insert_claim(model, txn).await?;

        let transitioned = self
            .db
            .mark_claimed(lock.id, timestamp, &meta.tx_hash, txn)
            .await?;
        if transitioned {
            let wallet_delta = WalletDelta {
                total_xburn_claimed: total,
                active_locks: -1,
                completed_locks: 1,
                ..Default::default()
            };
            self.db
                .apply_wallet_delta(user, self.chain_id, wallet_delta, txn)
                .await?;

            let term_delta = TermDelta {
                active_locks: -1,
                ..Default::default()
            };
            self.db
                .apply_term_delta(lock.term_days, self.chain_id, term_delta, txn)
                .await?;
        } else {
            debug!(lock_id = lock.id, "Lock already claimed or burned");
        }
        Ok(())
    }

    async fn handle_lock_burned(
        &self,
        meta: &LogMeta,
        timestamp: DateTime<Utc>,
        token_id: &str,
        txn: &DatabaseTransaction,
    ) -> Result<()> {
        let token_id = parse_amount(token_id)?;
        let lock = match self.db.find_burn_nft(&token_id, self.chain_id, txn).await? {
            Some(lock) => lock,
            None => {
                warn!(
                    %token_id,
                    tx_hash = %meta.tx_hash,
                    "Burn for unknown lock, skipping"
                );
                return Ok(());
            }
        };

        let early = is_early_burn(timestamp, lock.maturity_timestamp);
        let transitioned = self
            .db
            .mark_burned(lock.id, timestamp, &meta.tx_hash, early, txn)
            .await?;
        if transitioned {
            let wallet_delta = WalletDelta {
                active_locks: -1,
                early_unlocks: if early { 1 } else { 0 },
                ..Default::default()
            };
            self.db
                .apply_wallet_delta(&lock.user, self.chain_id, wallet_delta, txn)
                .await?;

            let term_delta = TermDelta {
                active_locks: -1,
                ..Default::default()
            };
            self.db
                .apply_term_delta(lock.term_days, self.chain_id, term_delta, txn)
                .await?;
        }
        Ok(())
    }

    async fn handle_transfer(
        &self,
        meta: &LogMeta,
        timestamp: DateTime<Utc>,
        from: &str,
        to: &str,
        token_id: &str,
        txn: &DatabaseTransaction,
    ) -> Result<()> {
        let token_id = parse_amount(token_id)?;
        let model = nft_transfers::ActiveModel {
            tx_hash: Set(meta.tx_hash.clone()),
            log_index: Set(meta.log_index),
            chain_id: Set(self.chain_id),
            block_number: Set(meta.block_number),
            timestamp: Set(timestamp),
            token_id: Set(token_id.clone()),
            from_address: Set(from.to_string()),
            to_address: Set(to.to_string()),
            ..Default::default()
        };
        let inserted = self.db.insert_transfer(model, txn).await?;

        // Mint and burn legs surface as zero-address transfers; the mint and
        // LockBurned handlers own those lock/aggregate moves.
        if !inserted || from == ZERO_ADDRESS || to == ZERO_ADDRESS {
            return Ok(());
        }

        let lock = match self.db.find_burn_nft(&token_id, self.chain_id, txn).await? {
            Some(lock) => lock,
            None => {
                warn!(
                    %token_id,
                    tx_hash = %meta.tx_hash,
                    "Transfer of unknown lock, skipping ownership update"
                );
                return Ok(());
            }
        };

        let changed = self.db.set_lock_owner(lock.id, to, txn).await?;
        if changed {
            self.db
                .apply_wallet_delta(
                    from,
                    self.chain_id,
                    WalletDelta {
                        active_locks: -1,
                        ..Default::default()
                    },
                    txn,
                )
                .await?;
            self.db
                .apply_wallet_delta(
                    to,
                    self.chain_id,
                    WalletDelta {
                        active_locks: 1,
                        ..Default::default()
                    },
                    txn,
                )
                .await?;
        }
        Ok(())
    }
}

fn parse_amount(value: &str) -> Result<BigDecimal> {
    BigDecimal::from_str(value).map_err(|e| eyre::eyre!("Invalid numeric value {value:?}: {e}"))
}

/// `None` when the term pushes the maturity outside the representable
/// timestamp range; a decoded `termDays` can be any value up to `i64::MAX`.
pub fn maturity_for(timestamp: DateTime<Utc>, term_days: i64) -> Option<DateTime<Utc>> {
    timestamp.checked_add_signed(Duration::try_days(term_days)?)
}

/// A burn before maturity forfeits the XBURN claim.
pub fn is_early_burn(burned_at: DateTime<Utc>, maturity: DateTime<Utc>) -> bool {
    burned_at < maturity
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use alloy::{
        primitives::{address, b256, Address, LogData, B256, U256},
        sol_types::SolEvent,
    };
    use chrono::TimeZone;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};

    use super::*;
    use crate::parser::XBurnMinter;

    const MINTER: Address = address!("0598dd8aCaBD947e2df48E1368779849D07f8483");
    const NFT: Address = address!("CB7d2A11d3271D2793E76C37Ad06ddEEb514C1fa");

    fn processor(db: Arc<DbClient>) -> EventProcessor {
        EventProcessor::new(db, EventParser::new(MINTER, NFT), 8453)
    }

    fn mint_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    fn make_log(address: Address, topics: Vec<B256>, data: Vec<u8>) -> Log {
        Log {
            inner: alloy::primitives::Log {
                address,
                data: LogData::new_unchecked(topics, data.into()),
            },
            block_hash: None,
            block_number: Some(1_000),
            block_timestamp: None,
            transaction_hash: Some(b256!(
                "1111111111111111111111111111111111111111111111111111111111111111"
            )),
            transaction_index: Some(0),
            log_index: Some(3),
            removed: false,
        }
    }

    fn claim_log(token_id: u64) -> Log {
        let user = address!("2222222222222222222222222222222222222222");
        let mut data = U256::from(100u64).to_be_bytes::<32>().to_vec();
        data.extend_from_slice(&U256::from(10u64).to_be_bytes::<32>());
        data.extend_from_slice(&U256::from(110u64).to_be_bytes::<32>());
        make_log(
            MINTER,
            vec![
                XBurnMinter::XBURNClaimed::SIGNATURE_HASH,
                user.into_word(),
                B256::from(U256::from(token_id).to_be_bytes::<32>()),
            ],
            data,
        )
    }

    fn xen_burned_log() -> Log {
        let user = address!("2222222222222222222222222222222222222222");
        make_log(
            MINTER,
            vec![XBurnMinter::XENBurned::SIGNATURE_HASH, user.into_word()],
            U256::from(1_000u64).to_be_bytes::<32>().to_vec(),
        )
    }

    fn id_row(id: i64) -> BTreeMap<&'static str, Value> {
        BTreeMap::from([("id", Value::BigInt(Some(id)))])
    }

    fn exec_hit() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }
    }

    fn exec_miss() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }
    }

    fn claimed_lock(token_id: u64) -> burn_nfts::Model {
        burn_nfts::Model {
            id: 1,
            token_id: BigDecimal::from(token_id),
            tx_hash: "0x1111111111111111111111111111111111111111111111111111111111111111"
                .to_string(),
            log_index: 0,
            chain_id: 8453,
            block_number: 900,
            timestamp: mint_time(),
            user: "0x2222222222222222222222222222222222222222".to_string(),
            xen_amount: BigDecimal::from(5_000),
            term_days: 7,
            maturity_timestamp: mint_time() + Duration::days(7),
            claimed: true,
            claimed_at: Some(mint_time()),
            claim_tx_hash: Some("0xaa".to_string()),
            burned: false,
            burned_at: None,
            burn_tx_hash: None,
            early_burn: false,
        }
    }

    async fn run_log(conn: sea_orm::DatabaseConnection, log: &Log) -> String {
        let db = Arc::new(DbClient::new(conn));
        let processor = processor(db.clone());

        let txn = db.begin().await.unwrap();
        processor.process_log(log, mint_time(), &txn).await.unwrap();
        txn.commit().await.unwrap();

        drop(processor);
        let db = Arc::try_unwrap(db).unwrap();
        db.conn
            .into_transaction_log()
            .iter()
            .flat_map(|txn| txn.statements())
            .map(|stmt| format!("{} {:?}", stmt.sql, stmt.values))
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn claim_for_unknown_lock_only_backfills_the_raw_row() {
        // Raw insert lands, the lock lookup comes back empty, and the only
        // remaining statement is the raw-row type back-fill.
        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![id_row(1)]])
            .append_query_results([Vec::<burn_nfts::Model>::new()])
            .append_exec_results([exec_hit()])
            .into_connection();

        let statements = run_log(conn, &claim_log(99)).await;
        assert!(statements.contains(r#"INSERT INTO "raw_events""#));
        assert!(statements.contains(r#"UPDATE "raw_events""#));
        assert!(statements.contains("XBURNClaimed"));
        assert!(!statements.contains("xburn_claims"));
        assert!(!statements.contains("wallet_stats"));
        assert!(!statements.contains("term_stats"));
    }

    #[tokio::test]
    async fn claim_on_finished_lock_records_but_skips_aggregates() {
        // The claim row is kept for audit, but the guarded transition
        // reports no match so neither aggregate moves.
        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![id_row(1)]])
            .append_query_results([vec![claimed_lock(42)]])
            .append_query_results([vec![id_row(2)]])
            .append_exec_results([exec_miss(), exec_hit()])
            .into_connection();

        let statements = run_log(conn, &claim_log(42)).await;
        assert!(statements.contains(r#"INSERT INTO "xburn_claims""#));
        assert!(statements.contains(r#"UPDATE "burn_nfts""#));
        assert!(!statements.contains("wallet_stats"));
        assert!(!statements.contains("term_stats"));
    }

    #[tokio::test]
    async fn replayed_burn_does_not_touch_aggregates() {
        // Both idempotent inserts report a conflict, so no delta applies.
        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([
                Vec::<BTreeMap<&'static str, Value>>::new(),
                Vec::new(),
            ])
            .append_exec_results([exec_hit()])
            .into_connection();

        let statements = run_log(conn, &xen_burned_log()).await;
        assert!(statements.contains(r#"INSERT INTO "xen_burns""#));
        assert!(statements.contains(r#"UPDATE "raw_events""#));
        assert!(!statements.contains("wallet_stats"));
    }

    #[tokio::test]
    async fn fresh_burn_applies_the_wallet_delta() {
        let conn = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![id_row(1)], vec![id_row(2)], vec![id_row(3)]])
            .append_exec_results([exec_hit()])
            .into_connection();

        let statements = run_log(conn, &xen_burned_log()).await;
        assert!(statements.contains(r#"INSERT INTO "xen_burns""#));
        assert!(statements.contains("wallet_stats"));
    }

    #[test]
    fn maturity_adds_whole_days() {
        let minted = Utc.with_ymd_and_hms(2025, 1, 1, 12, 30, 0).unwrap();
        let maturity = maturity_for(minted, 7).unwrap();
        assert_eq!(maturity, Utc.with_ymd_and_hms(2025, 1, 8, 12, 30, 0).unwrap());
    }

    #[test]
    fn absurd_lock_terms_do_not_overflow() {
        let minted = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(maturity_for(minted, i64::MAX), None);
        // Representable as a Duration but past the end of chrono's calendar.
        assert_eq!(maturity_for(minted, 200_000_000), None);
    }

    #[test]
    fn burn_at_or_after_maturity_is_not_early() {
        let maturity = Utc.with_ymd_and_hms(2025, 1, 8, 0, 0, 0).unwrap();
        assert!(is_early_burn(maturity - Duration::seconds(1), maturity));
        assert!(!is_early_burn(maturity, maturity));
        assert!(!is_early_burn(maturity + Duration::seconds(1), maturity));
    }

    #[test]
    fn amount_parsing_covers_uint256_range() {
        let max = "115792089237316195423570985008687907853269984665640564039457584007913129639935";
        assert!(parse_amount(max).is_ok());
        assert!(parse_amount("not-a-number").is_err());
    }
}
