use plsdao_provider::ProviderError;
use plsdao_store::StoreError;
use plsdao_types::{BackendKind, ChainId};
use serde::Serialize;
use thiserror::Error;

/// Failures of a user-initiated connection attempt.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("{} is not available", .backend.display_name())]
    BackendUnavailable {
        backend: BackendKind,
        /// Where the user can install the wallet, when known.
        install_url: Option<&'static str>,
    },

    #[error("connection to {} was rejected by the user", .backend.display_name())]
    ConnectionRejected { backend: BackendKind },

    #[error("failed to connect to {}: {message}", .backend.display_name())]
    ConnectionError {
        backend: BackendKind,
        message: String,
    },

    #[error("a connection attempt is already in progress")]
    AlreadyConnecting,

    #[error("connection attempt was superseded before it completed")]
    ConnectionAbandoned,

    #[error("auto-reconnect failed: {0}")]
    AutoReconnectFailed(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl WalletError {
    /// Map a provider failure during account acquisition.
    pub fn from_provider(backend: BackendKind, err: ProviderError) -> Self {
        if err.is_user_rejection() {
            Self::ConnectionRejected { backend }
        } else {
            Self::ConnectionError {
                backend,
                message: err.to_string(),
            }
        }
    }
}

/// Why the connected wallet is not on the required chain.
///
/// Never returned from `connect`: it is reported through the session as a
/// persistent "wrong network" indicator, since the account stays connected.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize)]
pub enum ChainError {
    #[error("the user declined to switch networks")]
    SwitchRejected,

    #[error("the wallet could not register the network: {0}")]
    RegistrationFailed(ProviderError),

    #[error("the wallet could not switch networks: {0}")]
    SwitchFailed(ProviderError),

    #[error("wallet is on chain {actual}")]
    WrongChain { actual: ChainId },

    #[error("could not read the wallet's chain: {0}")]
    Query(ProviderError),
}
