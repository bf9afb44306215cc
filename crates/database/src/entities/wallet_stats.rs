//! Incrementally materialized per-wallet aggregates. A cache over the
//! append-only event tables, never a source of truth: every increment is
//! gated on the underlying event row actually inserting.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "wallet_stats")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub wallet: String,
    pub chain_id: i64,
    #[sea_orm(column_type = "Decimal(Some((78, 0)))")]
    pub total_xen_burned: BigDecimal,
    #[sea_orm(column_type = "Decimal(Some((78, 0)))")]
    pub total_xburn_burned: BigDecimal,
    #[sea_orm(column_type = "Decimal(Some((78, 0)))")]
    pub total_xburn_claimed: BigDecimal,
    pub total_locks: i64,
    pub active_locks: i64,
    pub completed_locks: i64,
    pub early_unlocks: i64,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
