//! The BurnLock entity: one row per `(token_id, chain_id)`, created exactly
//! once by the mint event and only ever transitioned forward. Ownership
//! (`user`) changes on transfers only while the lock is neither claimed nor
//! burned.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "burn_nfts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_type = "Decimal(Some((78, 0)))")]
    pub token_id: BigDecimal,
    pub tx_hash: String,
    pub log_index: i32,
    pub chain_id: i64,
    pub block_number: i64,
    pub timestamp: DateTimeUtc,
    pub user: String,
    #[sea_orm(column_type = "Decimal(Some((78, 0)))")]
    pub xen_amount: BigDecimal,
    pub term_days: i64,
    pub maturity_timestamp: DateTimeUtc,
    pub claimed: bool,
    pub claimed_at: Option<DateTimeUtc>,
    pub claim_tx_hash: Option<String>,
    pub burned: bool,
    pub burned_at: Option<DateTimeUtc>,
    pub burn_tx_hash: Option<String>,
    pub early_burn: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
