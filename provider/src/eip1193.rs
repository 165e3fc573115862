//! Provider traits.

use async_trait::async_trait;

use crate::{Listener, ListenerId, ProviderError, ProviderEventKind};

/// An EIP-1193 provider: the object a browser wallet injects, or the
/// provider a relay SDK hands out.
///
/// Implementations are shared between several backend adapters (every
/// injected backend wraps the same handle), hence `&self` everywhere.
#[async_trait]
pub trait Eip1193Provider: Send + Sync {
    /// Perform a JSON-RPC request and return its `result`.
    async fn request(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError>;

    /// Register `listener` for `kind` events.
    fn on(&self, kind: ProviderEventKind, listener: Listener) -> ListenerId;

    /// Remove a listener. Returns whether it was registered.
    fn off(&self, id: ListenerId) -> bool;

    /// `isMetaMask` flag of the injected object.
    fn is_metamask(&self) -> bool {
        false
    }

    /// `isCoinbaseWallet` flag of the injected object.
    fn is_coinbase_wallet(&self) -> bool {
        false
    }
}

/// A provider that reaches the wallet through a relay session.
///
/// Relay providers have their own session lifecycle on top of EIP-1193:
/// the session must be established (or resumed) before requests work, and
/// it can be torn down explicitly.
#[async_trait]
pub trait RelayProvider: Eip1193Provider {
    /// Establish or resume the relay session; returns the authorized accounts.
    ///
    /// With no stored session this displays a pairing prompt and waits for
    /// the user's mobile wallet.
    async fn enable(&self) -> Result<Vec<String>, ProviderError>;

    /// End the relay session.
    async fn disconnect(&self) -> Result<(), ProviderError>;

    /// Whether a stored session exists that `enable` can resume.
    fn has_session(&self) -> bool;
}
