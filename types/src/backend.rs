//! Wallet backend identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// Which kind of wallet a connection goes through.
///
/// The string ids are stable: they are what gets persisted as the last used
/// backend and what the picker hands back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Injected browser extension identifying itself as MetaMask.
    MetaMask,
    /// Relay-based mobile wallet bridge.
    WalletConnect,
    /// Injected Coinbase Wallet extension.
    Coinbase,
    /// Any other injected provider.
    Injected,
}

impl BackendKind {
    /// All kinds, in the order the picker lists them.
    pub const ALL: [BackendKind; 4] = [
        BackendKind::MetaMask,
        BackendKind::WalletConnect,
        BackendKind::Coinbase,
        BackendKind::Injected,
    ];

    /// Stable identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MetaMask => "metamask",
            Self::WalletConnect => "walletconnect",
            Self::Coinbase => "coinbase",
            Self::Injected => "injected",
        }
    }

    /// Human-readable name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::MetaMask => "MetaMask",
            Self::WalletConnect => "WalletConnect",
            Self::Coinbase => "Coinbase Wallet",
            Self::Injected => "Other Wallet",
        }
    }

    /// Whether this backend talks to the wallet through a relay session
    /// rather than a locally injected object.
    pub fn is_relay(&self) -> bool {
        matches!(self, Self::WalletConnect)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "metamask" => Ok(Self::MetaMask),
            "walletconnect" => Ok(Self::WalletConnect),
            "coinbase" => Ok(Self::Coinbase),
            "injected" => Ok(Self::Injected),
            _ => Err(TypesError::UnknownBackend(s.to_string())),
        }
    }
}
