//! Provider-originated events.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::ProviderError;

/// The EIP-1193 events the wallet layer listens to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderEventKind {
    AccountsChanged,
    ChainChanged,
    Disconnect,
}

impl ProviderEventKind {
    pub const ALL: [ProviderEventKind; 3] = [
        ProviderEventKind::AccountsChanged,
        ProviderEventKind::ChainChanged,
        ProviderEventKind::Disconnect,
    ];

    /// Event name as passed to `provider.on(...)`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AccountsChanged => "accountsChanged",
            Self::ChainChanged => "chainChanged",
            Self::Disconnect => "disconnect",
        }
    }
}

impl fmt::Display for ProviderEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An event as emitted by the provider, payloads left undecoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProviderEvent {
    /// New account list; empty means the wallet locked or revoked access.
    AccountsChanged(Vec<String>),
    /// New chain id, hex string as reported.
    ChainChanged(String),
    /// The provider lost its connection (relay session ended).
    Disconnect(ProviderError),
}

impl ProviderEvent {
    pub fn kind(&self) -> ProviderEventKind {
        match self {
            Self::AccountsChanged(_) => ProviderEventKind::AccountsChanged,
            Self::ChainChanged(_) => ProviderEventKind::ChainChanged,
            Self::Disconnect(_) => ProviderEventKind::Disconnect,
        }
    }

    /// Decode the JSON payload a bridge received for `kind`.
    pub fn decode(
        kind: ProviderEventKind,
        payload: &serde_json::Value,
    ) -> Result<Self, ProviderError> {
        match kind {
            ProviderEventKind::AccountsChanged => {
                let accounts = payload
                    .as_array()
                    .ok_or_else(|| ProviderError::internal("accountsChanged payload is not a list"))?
                    .iter()
                    .filter_map(|a| a.as_str().map(str::to_string))
                    .collect();
                Ok(Self::AccountsChanged(accounts))
            }
            ProviderEventKind::ChainChanged => match payload {
                serde_json::Value::String(s) => Ok(Self::ChainChanged(s.clone())),
                serde_json::Value::Number(n) => Ok(Self::ChainChanged(n.to_string())),
                _ => Err(ProviderError::internal("chainChanged payload is not a chain id")),
            },
            ProviderEventKind::Disconnect => Ok(Self::Disconnect(ProviderError::from_json(payload))),
        }
    }
}

/// Handle returned by `on`, passed back to `off`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

/// An event callback. Invoked inline on the emitting task; keep it fast.
pub type Listener = Arc<dyn Fn(&ProviderEvent) + Send + Sync>;
