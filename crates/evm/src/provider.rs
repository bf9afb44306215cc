use std::sync::Arc;

use alloy::{
    primitives::Address,
    providers::{Provider, ProviderBuilder},
    rpc::types::{Filter, Log},
};
use eyre::{eyre, Result};
use tracing::{info, warn};

/// HTTP chain reader for one logical chain. Endpoint failover happens only
/// here, at connect time: the configured URLs are probed in priority order
/// and the first one answering a chain-id query wins. Mid-batch RPC errors
/// are not failed over; they propagate to the scheduler's retry policy.
#[derive(Clone)]
pub struct EvmProvider {
    http: Arc<dyn Provider + Send + Sync>,
    chain_id: u64,
}

impl EvmProvider {
    pub async fn connect(endpoints: &[String], chain_id: i64) -> Result<Self> {
        for url in endpoints {
            let parsed = match url.parse() {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(url, "Invalid RPC URL, trying next endpoint: {}", e);
                    continue;
                }
            };

            let provider = ProviderBuilder::new().on_http(parsed);
            match provider.get_chain_id().await {
                Ok(reported) => {
                    info!(url, chain_id = reported, "Connected to RPC provider");
                    return Ok(Self {
                        http: Arc::new(provider),
                        chain_id: reported,
                    });
                }
                Err(e) => {
                    warn!(url, "Failed to connect to RPC provider: {}", e);
                }
            }
        }

        Err(eyre!(
            "All RPC providers failed for chain {} ({} endpoints tried)",
            chain_id,
            endpoints.len()
        ))
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub async fn get_block_number(&self) -> Result<u64> {
        self.http.get_block_number().await.map_err(Into::into)
    }

    /// Logs for exactly one indexed contract and exactly its known event
    /// signatures over `[from_block, to_block]`. Nothing else is fetched.
    pub async fn get_logs(
        &self,
        address: Address,
        events: &[&str],
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<Log>> {
        let filter = Filter::new()
            .address(address)
            .events(events.iter().copied())
            .from_block(from_block)
            .to_block(to_block);

        self.http.get_logs(&filter).await.map_err(Into::into)
    }

    pub async fn get_block_timestamp(&self, block_number: u64) -> Result<u64> {
        let block = self
            .http
            .get_block_by_number(block_number.into(), false.into())
            .await?
            .ok_or_else(|| eyre!("Block {} not found", block_number))?;
        Ok(block.header.timestamp)
    }
}
