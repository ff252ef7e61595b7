use thiserror::Error;

use super::config::ConfigError;
use crate::core::io::pns::PnsError;
use crate::core::models::network::NetworkError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to load problem definition: {source}")]
    Definition {
        #[from]
        source: PnsError,
    },

    #[error("Invalid process network: {source}")]
    Network {
        #[from]
        source: NetworkError,
    },

    #[error("Invalid search configuration: {source}")]
    Config {
        #[from]
        source: ConfigError,
    },

    #[error(
        "Bound override vector has {found} slot(s) but the model declares {expected} variable(s)"
    )]
    OverrideLength { expected: usize, found: usize },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
