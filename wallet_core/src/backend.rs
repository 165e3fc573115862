//! The uniform wallet backend interface and the registry of backends.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use plsdao_provider::{
    Eip1193Provider, Listener, ListenerId, ProviderError, ProviderEvent, ProviderEventKind,
    RelayProvider,
};
use plsdao_types::{Address, BackendKind, ChainDescriptor, ChainId};

use crate::injected::InjectedBackend;
use crate::relay::RelayBackend;

/// A backend event with decoded payloads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendEvent {
    AccountsChanged(Vec<Address>),
    ChainChanged(ChainId),
    Disconnected,
}

/// Callback for [`BackendEvent`]s.
pub type BackendListener = Arc<dyn Fn(BackendEvent) + Send + Sync>;

/// One kind of wallet, behind the capability set the connection manager needs.
///
/// The manager depends only on this trait; every backend-specific quirk
/// (injection flags, relay sessions) lives in the implementations.
#[async_trait]
pub trait WalletBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Whether the wallet is present in the host environment.
    fn is_available(&self) -> bool;

    /// Ask the user to authorize accounts. May prompt.
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Accounts the user authorized earlier, without prompting.
    async fn authorized_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    async fn chain_id(&self) -> Result<ChainId, ProviderError>;

    async fn switch_chain(&self, chain: ChainId) -> Result<(), ProviderError>;

    async fn add_chain(&self, descriptor: &ChainDescriptor) -> Result<(), ProviderError>;

    fn on(&self, kind: ProviderEventKind, listener: BackendListener) -> ListenerId;

    fn off(&self, id: ListenerId) -> bool;

    /// End the backend's own session, if it has one.
    async fn teardown(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

/// Decode a list of raw account strings. Any malformed entry fails the lot.
pub(crate) fn parse_accounts(raw: Vec<String>) -> Result<Vec<Address>, ProviderError> {
    raw.into_iter()
        .map(|a| Address::parse(a).map_err(|e| ProviderError::internal(e.to_string())))
        .collect()
}

/// Wrap a [`BackendListener`] as a provider listener that decodes payloads.
///
/// Events with undecodable payloads are dropped: acting on a garbled
/// account list could be mistaken for an empty one.
pub(crate) fn bridge(backend: BackendKind, listener: BackendListener) -> Listener {
    Arc::new(move |event: &ProviderEvent| {
        let decoded = match event {
            ProviderEvent::AccountsChanged(raw) => {
                parse_accounts(raw.clone()).map(BackendEvent::AccountsChanged)
            }
            ProviderEvent::ChainChanged(raw) => ChainId::from_hex(raw)
                .map(BackendEvent::ChainChanged)
                .map_err(|e| ProviderError::internal(e.to_string())),
            ProviderEvent::Disconnect(_) => Ok(BackendEvent::Disconnected),
        };
        match decoded {
            Ok(event) => listener(event),
            Err(e) => {
                tracing::warn!(%backend, kind = %event.kind(), "dropping malformed event: {e}")
            }
        }
    })
}

/// The backends known to a connection manager, at most one per kind.
#[derive(Clone, Default)]
pub struct BackendSet {
    backends: HashMap<BackendKind, Arc<dyn WalletBackend>>,
}

impl BackendSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the standard set from what the host environment exposes.
    ///
    /// The injected handle is shared by the MetaMask, Coinbase and generic
    /// adapters; their availability flags decide which one applies.
    pub fn from_host(
        injected: Option<Arc<dyn Eip1193Provider>>,
        relay: Option<Arc<dyn RelayProvider>>,
    ) -> Self {
        let mut set = Self::new();
        if let Some(provider) = injected {
            set.register(Arc::new(InjectedBackend::metamask(Arc::clone(&provider))));
            set.register(Arc::new(InjectedBackend::coinbase(Arc::clone(&provider))));
            set.register(Arc::new(InjectedBackend::generic(provider)));
        }
        if let Some(relay) = relay {
            set.register(Arc::new(RelayBackend::new(relay)));
        }
        set
    }

    /// Add a backend, replacing any previous one of the same kind.
    pub fn register(&mut self, backend: Arc<dyn WalletBackend>) -> Option<Arc<dyn WalletBackend>> {
        self.backends.insert(backend.kind(), backend)
    }

    pub fn get(&self, kind: BackendKind) -> Option<Arc<dyn WalletBackend>> {
        self.backends.get(&kind).cloned()
    }

    /// Registered backends in picker order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn WalletBackend>> + '_ {
        BackendKind::ALL
            .iter()
            .filter_map(move |kind| self.backends.get(kind))
    }

    pub fn len(&self) -> usize {
        self.backends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plsdao_nullables::{NullProvider, NullRelayProvider};
    use std::sync::Mutex;

    const ACCOUNT: &str = "0x52908400098527886e0f7030069857d2e4169ee7";

    #[test]
    fn from_host_registers_every_adapter() {
        let injected: Arc<dyn Eip1193Provider> =
            Arc::new(NullProvider::metamask(vec![ACCOUNT], ChainId::PULSECHAIN));
        let relay: Arc<dyn RelayProvider> =
            Arc::new(NullRelayProvider::new(vec![ACCOUNT], ChainId::PULSECHAIN));
        let set = BackendSet::from_host(Some(injected), Some(relay));

        let kinds: Vec<_> = set.iter().map(|b| b.kind()).collect();
        assert_eq!(kinds, BackendKind::ALL.to_vec());
        assert!(set.get(BackendKind::MetaMask).unwrap().is_available());
        assert!(!set.get(BackendKind::Coinbase).unwrap().is_available());
        assert!(!set.get(BackendKind::Injected).unwrap().is_available());
    }

    #[test]
    fn no_injected_provider_means_relay_only() {
        let relay: Arc<dyn RelayProvider> =
            Arc::new(NullRelayProvider::new(vec![ACCOUNT], ChainId::PULSECHAIN));
        let set = BackendSet::from_host(None, Some(relay));
        assert_eq!(set.len(), 1);
        assert!(set.get(BackendKind::MetaMask).is_none());
    }

    #[test]
    fn bridge_decodes_and_drops_garbage() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let listener = bridge(
            BackendKind::Injected,
            Arc::new(move |event: BackendEvent| s.lock().unwrap().push(event)),
        );

        listener(&ProviderEvent::ChainChanged("0x171".into()));
        listener(&ProviderEvent::ChainChanged("pulse".into()));
        listener(&ProviderEvent::AccountsChanged(vec!["not-an-address".into()]));
        listener(&ProviderEvent::AccountsChanged(vec![]));

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                BackendEvent::ChainChanged(ChainId::PULSECHAIN),
                BackendEvent::AccountsChanged(vec![]),
            ]
        );
    }
}
