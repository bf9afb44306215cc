pub mod cache;
pub mod error;
pub mod indexer;
pub mod parser;
pub mod processor;
pub mod provider;
