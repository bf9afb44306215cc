use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Shared columns of the append-only event tables: the idempotency key plus
/// block placement and timestamp.
fn event_table_base(table: impl Iden + Copy + 'static, id: impl Iden + 'static) -> TableCreateStatement {
    Table::create()
        .table(table)
        .if_not_exists()
        .col(
            ColumnDef::new(id)
                .big_integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                event_table_base(XenBurns::Table, XenBurns::Id)
                    .col(ColumnDef::new(XenBurns::TxHash).string_len(66).not_null())
                    .col(ColumnDef::new(XenBurns::LogIndex).integer().not_null())
                    .col(ColumnDef::new(XenBurns::ChainId).big_integer().not_null())
                    .col(
                        ColumnDef::new(XenBurns::BlockNumber)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(XenBurns::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(XenBurns::User).string_len(42).not_null())
                    .col(
                        ColumnDef::new(XenBurns::Amount)
                            .decimal_len(78, 0)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(XenBurns::AccumulatedAmount)
                            .decimal_len(78, 0)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(XenBurns::DirectBurnAmount)
                            .decimal_len(78, 0)
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                event_table_base(XburnBurns::Table, XburnBurns::Id)
                    .col(
                        ColumnDef::new(XburnBurns::TxHash)
                            .string_len(66)
                            .not_null(),
                    )
                    .col(ColumnDef::new(XburnBurns::LogIndex).integer().not_null())
                    .col(
                        ColumnDef::new(XburnBurns::ChainId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(XburnBurns::BlockNumber)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(XburnBurns::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(XburnBurns::User).string_len(42).not_null())
                    .col(
                        ColumnDef::new(XburnBurns::Amount)
                            .decimal_len(78, 0)
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                event_table_base(XburnClaims::Table, XburnClaims::Id)
                    .col(
                        ColumnDef::new(XburnClaims::TxHash)
                            .string_len(66)
                            .not_null(),
                    )
                    .col(ColumnDef::new(XburnClaims::LogIndex).integer().not_null())
                    .col(
                        ColumnDef::new(XburnClaims::ChainId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(XburnClaims::BlockNumber)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(XburnClaims::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(XburnClaims::UserAddress)
                            .string_len(42)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(XburnClaims::TokenId)
                            .decimal_len(78, 0)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(XburnClaims::BaseAmount)
                            .decimal_len(78, 0)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(XburnClaims::BonusAmount)
                            .decimal_len(78, 0)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(XburnClaims::TotalAmount)
                            .decimal_len(78, 0)
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                event_table_base(BurnNfts::Table, BurnNfts::Id)
                    .col(
                        ColumnDef::new(BurnNfts::TokenId)
                            .decimal_len(78, 0)
                            .not_null(),
                    )
                    .col(ColumnDef::new(BurnNfts::TxHash).string_len(66).not_null())
                    .col(ColumnDef::new(BurnNfts::LogIndex).integer().not_null())
                    .col(ColumnDef::new(BurnNfts::ChainId).big_integer().not_null())
                    .col(
                        ColumnDef::new(BurnNfts::BlockNumber)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BurnNfts::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BurnNfts::User).string_len(42).not_null())
                    .col(
                        ColumnDef::new(BurnNfts::XenAmount)
                            .decimal_len(78, 0)
                            .not_null(),
                    )
                    .col(ColumnDef::new(BurnNfts::TermDays).big_integer().not_null())
                    .col(
                        ColumnDef::new(BurnNfts::MaturityTimestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BurnNfts::Claimed)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(BurnNfts::ClaimedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(BurnNfts::ClaimTxHash).string_len(66))
                    .col(
                        ColumnDef::new(BurnNfts::Burned)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(BurnNfts::BurnedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(BurnNfts::BurnTxHash).string_len(66))
                    .col(
                        ColumnDef::new(BurnNfts::EarlyBurn)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                event_table_base(NftTransfers::Table, NftTransfers::Id)
                    .col(
                        ColumnDef::new(NftTransfers::TxHash)
                            .string_len(66)
                            .not_null(),
                    )
                    .col(ColumnDef::new(NftTransfers::LogIndex).integer().not_null())
                    .col(
                        ColumnDef::new(NftTransfers::ChainId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NftTransfers::BlockNumber)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NftTransfers::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NftTransfers::TokenId)
                            .decimal_len(78, 0)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NftTransfers::FromAddress)
                            .string_len(42)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(NftTransfers::ToAddress)
                            .string_len(42)
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Idempotency keys: one row per on-chain log, however often the
        // window is re-scanned.
        for (name, table, tx, log, chain) in [
            (
                "uq_xen_burns_tx_log_chain",
                XenBurns::Table.into_iden(),
                XenBurns::TxHash.into_iden(),
                XenBurns::LogIndex.into_iden(),
                XenBurns::ChainId.into_iden(),
            ),
            (
                "uq_xburn_burns_tx_log_chain",
                XburnBurns::Table.into_iden(),
                XburnBurns::TxHash.into_iden(),
                XburnBurns::LogIndex.into_iden(),
                XburnBurns::ChainId.into_iden(),
            ),
            (
                "uq_xburn_claims_tx_log_chain",
                XburnClaims::Table.into_iden(),
                XburnClaims::TxHash.into_iden(),
                XburnClaims::LogIndex.into_iden(),
                XburnClaims::ChainId.into_iden(),
            ),
            (
                "uq_burn_nfts_tx_log_chain",
                BurnNfts::Table.into_iden(),
                BurnNfts::TxHash.into_iden(),
                BurnNfts::LogIndex.into_iden(),
                BurnNfts::ChainId.into_iden(),
            ),
            (
                "uq_nft_transfers_tx_log_chain",
                NftTransfers::Table.into_iden(),
                NftTransfers::TxHash.into_iden(),
                NftTransfers::LogIndex.into_iden(),
                NftTransfers::ChainId.into_iden(),
            ),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(table)
                        .col(tx)
                        .col(log)
                        .col(chain)
                        .unique()
                        .to_owned(),
                )
                .await?;
        }

        // One lock per token per chain.
        manager
            .create_index(
                Index::create()
                    .name("uq_burn_nfts_token_chain")
                    .table(BurnNfts::Table)
                    .col(BurnNfts::TokenId)
                    .col(BurnNfts::ChainId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_burn_nfts_user")
                    .table(BurnNfts::Table)
                    .col(BurnNfts::ChainId)
                    .col(BurnNfts::User)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(NftTransfers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BurnNfts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(XburnClaims::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(XburnBurns::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(XenBurns::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden, Clone, Copy)]
enum XenBurns {
    Table,
    Id,
    TxHash,
    LogIndex,
    ChainId,
    BlockNumber,
    Timestamp,
    User,
    Amount,
    AccumulatedAmount,
    DirectBurnAmount,
}

#[derive(DeriveIden, Clone, Copy)]
enum XburnBurns {
    Table,
    Id,
    TxHash,
    LogIndex,
    ChainId,
    BlockNumber,
    Timestamp,
    User,
    Amount,
}

#[derive(DeriveIden, Clone, Copy)]
enum XburnClaims {
    Table,
    Id,
    TxHash,
    LogIndex,
    ChainId,
    BlockNumber,
    Timestamp,
    UserAddress,
    TokenId,
    BaseAmount,
    BonusAmount,
    TotalAmount,
}

#[derive(DeriveIden, Clone, Copy)]
enum BurnNfts {
    Table,
    Id,
    TokenId,
    TxHash,
    LogIndex,
    ChainId,
    BlockNumber,
    Timestamp,
    User,
    XenAmount,
    TermDays,
    MaturityTimestamp,
    Claimed,
    ClaimedAt,
    ClaimTxHash,
    Burned,
    BurnedAt,
    BurnTxHash,
    EarlyBurn,
}

#[derive(DeriveIden, Clone, Copy)]
enum NftTransfers {
    Table,
    Id,
    TxHash,
    LogIndex,
    ChainId,
    BlockNumber,
    Timestamp,
    TokenId,
    FromAddress,
    ToAddress,
}
