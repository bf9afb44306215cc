use alloy::primitives::{Address, B256};

/// Why one log could not be turned into a domain event. Never fails a batch:
/// the raw event row keeps its "unknown" type and processing moves on.
#[derive(Debug)]
pub enum ParserError {
    MissingTopic,
    UnknownAddress {
        address: Address,
    },
    UnknownEvent {
        signature: B256,
    },
    DecodeError {
        event_type: &'static str,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    NumberOverflow {
        value: String,
    },
}

impl std::error::Error for ParserError {}

impl std::fmt::Display for ParserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParserError::MissingTopic => write!(f, "Log carries no topic0"),
            ParserError::UnknownAddress { address } => {
                write!(f, "Log from unindexed contract: {}", address)
            }
            ParserError::UnknownEvent { signature } => {
                write!(f, "Unknown event type: {}", signature)
            }
            ParserError::DecodeError { event_type, source } => {
                write!(f, "Failed to decode {} event: {}", event_type, source)
            }
            ParserError::NumberOverflow { value } => {
                write!(f, "Value {} does not fit the target column", value)
            }
        }
    }
}

/// Batch-level failure, consumed by the scheduler's retry policy. Both
/// variants are retryable; fatal failures exist only at initialization.
#[derive(Debug)]
pub enum IndexError {
    /// RPC fetch failed (unreachable endpoint, timeout, missing block).
    Transport(eyre::Report),
    /// The batch transaction could not be applied or committed.
    Persistence(eyre::Report),
}

impl std::error::Error for IndexError {}

impl std::fmt::Display for IndexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexError::Transport(e) => write!(f, "Transport error: {:?}", e),
            IndexError::Persistence(e) => write!(f, "Persistence error: {:?}", e),
        }
    }
}
