use config::{Config, File};
use dotenv::dotenv;
use eyre::{eyre, Result};
use serde::{de::DeserializeOwned, Deserialize};

fn config_from_env() -> Result<AppConfig> {
    dotenv().ok();

    let settings = Config::builder()
        .add_source(File::with_name("config.yaml").required(false))
        .add_source(
            config::Environment::default()
                .separator("__")
                .list_separator(","),
        )
        .build()?;

    settings.try_deserialize().map_err(eyre::Error::from)
}

pub trait LoadFromEnv: Sized + DeserializeOwned {
    fn load() -> Result<Self>;
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub indexer: Option<IndexerConfig>,
    pub api: Option<ApiConfig>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ChainConfig {
    pub chain_id: i64,
    pub name: String,
    pub rpc_url: String,
    #[serde(default)]
    pub backup_rpc_urls: Vec<String>,
    pub start_block: u64,
    /// Initial (and maximum) number of blocks fetched per batch window.
    pub batch_size: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

impl ChainConfig {
    /// Primary endpoint first, then backups, in priority order.
    pub fn rpc_endpoints(&self) -> Vec<String> {
        let mut urls = vec![self.rpc_url.clone()];
        urls.extend(self.backup_rpc_urls.iter().cloned());
        urls
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct ContractsConfig {
    pub xburn_minter: String,
    pub xburn_nft: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct IndexerConfig {
    pub database: DatabaseConfig,
    pub chain: ChainConfig,
    pub contracts: ContractsConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApiConfig {
    pub database: DatabaseConfig,
    pub port: u16,
    pub chain_id: i64,
    pub chain_name: String,
}

fn default_poll_interval_ms() -> u64 {
    15_000
}

fn default_max_retries() -> u32 {
    5
}

fn default_retry_base_delay_ms() -> u64 {
    1_000
}

impl LoadFromEnv for IndexerConfig {
    fn load() -> Result<Self> {
        config_from_env()?
            .indexer
            .ok_or_else(|| eyre!("Configuration for the 'indexer' service is missing."))
    }
}

impl LoadFromEnv for ApiConfig {
    fn load() -> Result<Self> {
        config_from_env()?
            .api
            .ok_or_else(|| eyre!("Configuration for the 'api' service is missing."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_endpoints_keep_priority_order() {
        let chain = ChainConfig {
            chain_id: 1,
            name: "ethereum".to_string(),
            rpc_url: "https://primary.example".to_string(),
            backup_rpc_urls: vec![
                "https://backup-1.example".to_string(),
                "https://backup-2.example".to_string(),
            ],
            start_block: 0,
            batch_size: 500,
            poll_interval_ms: default_poll_interval_ms(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
        };

        assert_eq!(
            chain.rpc_endpoints(),
            vec![
                "https://primary.example",
                "https://backup-1.example",
                "https://backup-2.example",
            ]
        );
    }
}
