use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(IndexerState::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IndexerState::ChainId)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(IndexerState::LastIndexedBlock)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IndexerState::LastIndexedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IndexerState::BatchSize)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IndexerState::RetryCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RawEvents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RawEvents::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RawEvents::ChainId).big_integer().not_null())
                    .col(
                        ColumnDef::new(RawEvents::BlockNumber)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RawEvents::TxHash)
                            .string_len(66)
                            .not_null(),
                    )
                    .col(ColumnDef::new(RawEvents::LogIndex).integer().not_null())
                    .col(
                        ColumnDef::new(RawEvents::Address)
                            .string_len(42)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RawEvents::EventType)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(RawEvents::Data).json_binary().not_null())
                    .col(
                        ColumnDef::new(RawEvents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_raw_events_tx_log_chain")
                    .table(RawEvents::Table)
                    .col(RawEvents::TxHash)
                    .col(RawEvents::LogIndex)
                    .col(RawEvents::ChainId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_raw_events_chain_block")
                    .table(RawEvents::Table)
                    .col(RawEvents::ChainId)
                    .col(RawEvents::BlockNumber)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(IndexerMetrics::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(IndexerMetrics::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(IndexerMetrics::ChainId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IndexerMetrics::BlockNumber)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IndexerMetrics::BatchSize)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IndexerMetrics::EventsProcessed)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IndexerMetrics::BatchTimeMs)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IndexerMetrics::MemoryUsageMb)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IndexerMetrics::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_indexer_metrics_chain_block")
                    .table(IndexerMetrics::Table)
                    .col(IndexerMetrics::ChainId)
                    .col(IndexerMetrics::BlockNumber)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(IndexerMetrics::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RawEvents::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IndexerState::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum IndexerState {
    Table,
    ChainId,
    LastIndexedBlock,
    LastIndexedAt,
    BatchSize,
    RetryCount,
}

#[derive(DeriveIden)]
enum RawEvents {
    Table,
    Id,
    ChainId,
    BlockNumber,
    TxHash,
    LogIndex,
    Address,
    EventType,
    Data,
    CreatedAt,
}

#[derive(DeriveIden)]
enum IndexerMetrics {
    Table,
    Id,
    ChainId,
    BlockNumber,
    BatchSize,
    EventsProcessed,
    BatchTimeMs,
    MemoryUsageMb,
    Timestamp,
}
