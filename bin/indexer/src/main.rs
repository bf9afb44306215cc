use std::sync::Arc;

use common::config::{IndexerConfig, LoadFromEnv};
use database::client::DbClient;
use evm::indexer::BurnIndexer;
use eyre::Result;
use migration::{Migrator, MigratorTrait};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cfg = IndexerConfig::load()?;

    let db_conn = database::connect::connect(&cfg.database.url).await?;
    Migrator::up(&db_conn, None).await?;
    info!("Connected to database, migrations applied");

    let db = Arc::new(DbClient::new(db_conn));
    let mut indexer = BurnIndexer::new(cfg, db).await?;

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                if let Err(e) = res {
                    error!("Failed to listen for SIGINT: {}", e);
                }
            }
            _ = sigterm() => {}
        }
        info!("Shutdown signal received, stopping after current batch");
        let _ = stop_tx.send(true);
    });

    indexer.run(stop_rx).await
}

async fn sigterm() {
    match signal(SignalKind::terminate()) {
        Ok(mut stream) => {
            stream.recv().await;
        }
        Err(e) => {
            error!("Failed to listen for SIGTERM: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
