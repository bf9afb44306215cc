//! Immutable audit row for every fetched log, keyed by
//! `(tx_hash, log_index, chain_id)`. `event_type` starts as "unknown" and is
//! back-filled once decoding succeeds; nothing else is ever updated.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "raw_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub chain_id: i64,
    pub block_number: i64,
    pub tx_hash: String,
    pub log_index: i32,
    pub address: String,
    pub event_type: String,
    #[sea_orm(column_type = "JsonBinary")]
    pub data: Json,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
