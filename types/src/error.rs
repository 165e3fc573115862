//! Top-level error type shared across crates.

use thiserror::Error;

/// Errors produced while parsing or validating the fundamental types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypesError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid chain id: {0}")]
    InvalidChainId(String),

    #[error("unknown wallet backend: {0}")]
    UnknownBackend(String),

    #[error("invalid chain descriptor: {0}")]
    InvalidDescriptor(String),
}
