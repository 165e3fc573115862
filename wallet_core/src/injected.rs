//! Backends over an injected browser provider.

use async_trait::async_trait;
use std::sync::Arc;

use plsdao_provider::{rpc, Eip1193Provider, ListenerId, ProviderError, ProviderEventKind};
use plsdao_types::{Address, BackendKind, ChainDescriptor, ChainId};

use crate::backend::{bridge, parse_accounts, BackendListener, WalletBackend};

/// A wallet reached through the page's injected provider.
///
/// One injected handle serves three backend kinds; which one applies is
/// decided by the flags the extension sets on it.
pub struct InjectedBackend {
    kind: BackendKind,
    provider: Arc<dyn Eip1193Provider>,
}

impl InjectedBackend {
    /// The injected handle, used when it identifies as MetaMask.
    pub fn metamask(provider: Arc<dyn Eip1193Provider>) -> Self {
        Self {
            kind: BackendKind::MetaMask,
            provider,
        }
    }

    /// The injected handle, used when it identifies as Coinbase Wallet.
    pub fn coinbase(provider: Arc<dyn Eip1193Provider>) -> Self {
        Self {
            kind: BackendKind::Coinbase,
            provider,
        }
    }

    /// The injected handle, used when it is some other wallet.
    pub fn generic(provider: Arc<dyn Eip1193Provider>) -> Self {
        Self {
            kind: BackendKind::Injected,
            provider,
        }
    }
}

#[async_trait]
impl WalletBackend for InjectedBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn is_available(&self) -> bool {
        let metamask = self.provider.is_metamask();
        let coinbase = self.provider.is_coinbase_wallet();
        match self.kind {
            BackendKind::MetaMask => metamask,
            BackendKind::Coinbase => coinbase,
            BackendKind::Injected => !metamask && !coinbase,
            BackendKind::WalletConnect => false,
        }
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        parse_accounts(rpc::request_accounts(self.provider.as_ref()).await?)
    }

    async fn authorized_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        parse_accounts(rpc::accounts(self.provider.as_ref()).await?)
    }

    async fn chain_id(&self) -> Result<ChainId, ProviderError> {
        rpc::chain_id(self.provider.as_ref()).await
    }

    async fn switch_chain(&self, chain: ChainId) -> Result<(), ProviderError> {
        rpc::switch_chain(self.provider.as_ref(), chain).await
    }

    async fn add_chain(&self, descriptor: &ChainDescriptor) -> Result<(), ProviderError> {
        rpc::add_chain(self.provider.as_ref(), descriptor).await
    }

    fn on(&self, kind: ProviderEventKind, listener: BackendListener) -> ListenerId {
        self.provider.on(kind, bridge(self.kind, listener))
    }

    fn off(&self, id: ListenerId) -> bool {
        self.provider.off(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plsdao_nullables::NullProvider;

    const ACCOUNT: &str = "0x52908400098527886e0f7030069857d2e4169ee7";

    fn adapters(provider: NullProvider) -> [InjectedBackend; 3] {
        let provider: Arc<dyn Eip1193Provider> = Arc::new(provider);
        [
            InjectedBackend::metamask(Arc::clone(&provider)),
            InjectedBackend::coinbase(Arc::clone(&provider)),
            InjectedBackend::generic(provider),
        ]
    }

    fn available(provider: NullProvider) -> Vec<bool> {
        adapters(provider).iter().map(|b| b.is_available()).collect()
    }

    #[test]
    fn availability_follows_injection_flags() {
        assert_eq!(
            available(NullProvider::metamask(vec![ACCOUNT], ChainId::PULSECHAIN)),
            vec![true, false, false]
        );
        assert_eq!(
            available(NullProvider::coinbase(vec![ACCOUNT], ChainId::PULSECHAIN)),
            vec![false, true, false]
        );
        assert_eq!(
            available(NullProvider::new(vec![ACCOUNT], ChainId::PULSECHAIN)),
            vec![false, false, true]
        );
    }

    #[tokio::test]
    async fn accounts_are_parsed() {
        let backend = InjectedBackend::generic(Arc::new(NullProvider::new(
            vec![ACCOUNT],
            ChainId::PULSECHAIN,
        )));
        assert!(backend.authorized_accounts().await.unwrap().is_empty());
        let accounts = backend.request_accounts().await.unwrap();
        assert_eq!(accounts, vec![Address::parse(ACCOUNT).unwrap()]);
    }

    #[tokio::test]
    async fn malformed_account_is_an_error() {
        let backend = InjectedBackend::generic(Arc::new(NullProvider::new(
            vec!["0xnope"],
            ChainId::PULSECHAIN,
        )));
        let err = backend.request_accounts().await.unwrap_err();
        assert_eq!(err.code, ProviderError::INTERNAL);
    }
}
