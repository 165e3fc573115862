//! Backend over a relay session (mobile wallets).

use async_trait::async_trait;
use std::sync::Arc;

use plsdao_provider::{rpc, ListenerId, ProviderError, ProviderEventKind, RelayProvider};
use plsdao_types::{Address, BackendKind, ChainDescriptor, ChainId};

use crate::backend::{bridge, parse_accounts, BackendListener, WalletBackend};

/// A mobile wallet reached through a relay session.
///
/// Account acquisition goes through the relay's own session bootstrap:
/// `enable` resumes a stored session or shows the pairing prompt. That also
/// applies to silent reconnects, which may therefore take as long as the
/// user needs to approve on their phone.
pub struct RelayBackend {
    provider: Arc<dyn RelayProvider>,
}

impl RelayBackend {
    pub fn new(provider: Arc<dyn RelayProvider>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl WalletBackend for RelayBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::WalletConnect
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        parse_accounts(self.provider.enable().await?)
    }

    async fn authorized_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        tracing::debug!(
            stored_session = self.provider.has_session(),
            "resuming relay session"
        );
        parse_accounts(self.provider.enable().await?)
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
        self.provider.on(kind, bridge(BackendKind::WalletConnect, listener))
    }

    fn off(&self, id: ListenerId) -> bool {
        self.provider.off(id)
    }

    async fn teardown(&self) -> Result<(), ProviderError> {
        self.provider.disconnect().await
    }
}
