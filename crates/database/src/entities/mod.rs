pub mod burn_nfts;
pub mod indexer_metrics;
pub mod indexer_state;
pub mod nft_transfers;
pub mod raw_events;
pub mod term_stats;
pub mod wallet_stats;
pub mod xburn_burns;
pub mod xburn_claims;
pub mod xen_burns;
