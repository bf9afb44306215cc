use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WalletStats::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WalletStats::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WalletStats::Wallet)
                            .string_len(42)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WalletStats::ChainId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WalletStats::TotalXenBurned)
                            .decimal_len(78, 0)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(WalletStats::TotalXburnBurned)
                            .decimal_len(78, 0)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(WalletStats::TotalXburnClaimed)
                            .decimal_len(78, 0)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(WalletStats::TotalLocks)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(WalletStats::ActiveLocks)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(WalletStats::CompletedLocks)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(WalletStats::EarlyUnlocks)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(WalletStats::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_wallet_stats_wallet_chain")
                    .table(WalletStats::Table)
                    .col(WalletStats::Wallet)
                    .col(WalletStats::ChainId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TermStats::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TermStats::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(TermStats::TermDays).big_integer().not_null())
                    .col(ColumnDef::new(TermStats::ChainId).big_integer().not_null())
                    .col(
                        ColumnDef::new(TermStats::TotalLocks)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TermStats::ActiveLocks)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TermStats::TotalXenLocked)
                            .decimal_len(78, 0)
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(TermStats::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_term_stats_term_chain")
                    .table(TermStats::Table)
                    .col(TermStats::TermDays)
                    .col(TermStats::ChainId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TermStats::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WalletStats::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum WalletStats {
    Table,
    Id,
    Wallet,
    ChainId,
    TotalXenBurned,
    TotalXburnBurned,
    TotalXburnClaimed,
    TotalLocks,
    ActiveLocks,
    CompletedLocks,
    EarlyUnlocks,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TermStats {
    Table,
    Id,
    TermDays,
    ChainId,
    TotalLocks,
    ActiveLocks,
    TotalXenLocked,
    UpdatedAt,
}
