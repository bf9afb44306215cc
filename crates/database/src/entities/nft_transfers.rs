use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "nft_transfers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub tx_hash: String,
    pub log_index: i32,
    pub chain_id: i64,
    pub block_number: i64,
    pub timestamp: DateTimeUtc,
    #[sea_orm(column_type = "Decimal(Some((78, 0)))")]
    pub token_id: BigDecimal,
    pub from_address: String,
    pub to_address: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
