use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "term_stats")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub term_days: i64,
    pub chain_id: i64,
    pub total_locks: i64,
    pub active_locks: i64,
    #[sea_orm(column_type = "Decimal(Some((78, 0)))")]
    pub total_xen_locked: BigDecimal,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
