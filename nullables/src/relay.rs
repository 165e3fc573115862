//! Nullable relay provider: a mobile wallet reached through a fake relay session.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use plsdao_provider::{
    Eip1193Provider, Listener, ListenerId, ProviderError, ProviderEvent, ProviderEventKind,
    RelayProvider,
};
use plsdao_types::ChainId;

use crate::NullProvider;

/// A relay provider wrapping a [`NullProvider`] as the remote wallet.
///
/// `enable` establishes (or resumes) the session and authorizes the wallet;
/// `disconnect` ends it. Requests are forwarded to the inner wallet, so all
/// of its scripting is available through [`wallet`](Self::wallet).
pub struct NullRelayProvider {
    wallet: NullProvider,
    session: AtomicBool,
    enable_outcomes: Mutex<VecDeque<ProviderError>>,
    enables: AtomicUsize,
    disconnects: AtomicUsize,
}

impl NullRelayProvider {
    pub fn new(accounts: Vec<&str>, chain: ChainId) -> Self {
        Self {
            wallet: NullProvider::new(accounts, chain),
            session: AtomicBool::new(false),
            enable_outcomes: Mutex::new(VecDeque::new()),
            enables: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
        }
    }

    /// A provider with a stored session from an earlier visit.
    pub fn with_session(accounts: Vec<&str>, chain: ChainId) -> Self {
        let relay = Self::new(accounts, chain);
        relay.session.store(true, Ordering::SeqCst);
        relay.wallet.authorize();
        relay
    }

    /// The remote wallet, for scripting and assertions.
    pub fn wallet(&self) -> &NullProvider {
        &self.wallet
    }

    /// Fail the next `enable` with `error` (e.g. the user closed the pairing modal).
    pub fn fail_next_enable(&self, error: ProviderError) {
        self.enable_outcomes.lock().unwrap().push_back(error);
    }

    /// Hold `enable` calls until [`release_enable`](Self::release_enable).
    pub fn hold_enable(&self) {
        self.wallet.hold(ENABLE);
    }

    pub fn release_enable(&self) {
        self.wallet.release(ENABLE);
    }

    /// The wallet ended the session from its side.
    pub fn end_session_remotely(&self) {
        self.session.store(false, Ordering::SeqCst);
        self.wallet.revoke();
        self.wallet
            .emit(ProviderEvent::Disconnect(ProviderError::disconnected()));
    }

    pub fn enable_count(&self) -> usize {
        self.enables.load(Ordering::SeqCst)
    }

    pub fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

/// Gate name for `enable` in the inner wallet.
const ENABLE: &str = "relay_enable";

#[async_trait]
impl Eip1193Provider for NullRelayProvider {
    async fn request(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        if !self.session.load(Ordering::SeqCst) {
            return Err(ProviderError::disconnected());
        }
        self.wallet.request(method, params).await
    }

    fn on(&self, kind: ProviderEventKind, listener: Listener) -> ListenerId {
        self.wallet.on(kind, listener)
    }

    fn off(&self, id: ListenerId) -> bool {
        self.wallet.off(id)
    }
}

#[async_trait]
impl RelayProvider for NullRelayProvider {
    async fn enable(&self) -> Result<Vec<String>, ProviderError> {
        self.enables.fetch_add(1, Ordering::SeqCst);
        self.wallet.pass_gate(ENABLE).await;

        if let Some(error) = self.enable_outcomes.lock().unwrap().pop_front() {
            return Err(error);
        }
        self.session.store(true, Ordering::SeqCst);
        let accounts = self
            .wallet
            .request(plsdao_provider::rpc::ETH_REQUEST_ACCOUNTS, serde_json::json!([]))
            .await?;
        serde_json::from_value(accounts).map_err(|e| ProviderError::internal(e.to_string()))
    }

    async fn disconnect(&self) -> Result<(), ProviderError> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        self.session.store(false, Ordering::SeqCst);
        self.wallet.revoke();
        Ok(())
    }

    fn has_session(&self) -> bool {
        self.session.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plsdao_provider::rpc;

    const ACCOUNT: &str = "0x52908400098527886e0f7030069857d2e4169ee7";

    #[tokio::test]
    async fn requests_fail_without_session() {
        let relay = NullRelayProvider::new(vec![ACCOUNT], ChainId::PULSECHAIN);
        let err = rpc::chain_id(&relay).await.unwrap_err();
        assert_eq!(err.code, ProviderError::DISCONNECTED);
    }

    #[tokio::test]
    async fn enable_opens_session() {
        let relay = NullRelayProvider::new(vec![ACCOUNT], ChainId::PULSECHAIN);
        assert_eq!(relay.enable().await.unwrap(), vec![ACCOUNT]);
        assert!(relay.has_session());
        assert_eq!(rpc::chain_id(&relay).await.unwrap(), ChainId::PULSECHAIN);
    }

    #[tokio::test]
    async fn disconnect_ends_session() {
        let relay = NullRelayProvider::with_session(vec![ACCOUNT], ChainId::PULSECHAIN);
        relay.disconnect().await.unwrap();
        assert!(!relay.has_session());
        assert_eq!(relay.disconnect_count(), 1);
    }

    #[tokio::test]
    async fn scripted_enable_failure() {
        let relay = NullRelayProvider::new(vec![ACCOUNT], ChainId::PULSECHAIN);
        relay.fail_next_enable(ProviderError::user_rejected());
        assert!(relay.enable().await.unwrap_err().is_user_rejection());
        assert!(!relay.has_session());
    }

    #[tokio::test]
    async fn held_enable_waits_for_release() {
        let relay = std::sync::Arc::new(NullRelayProvider::new(vec![ACCOUNT], ChainId::PULSECHAIN));
        relay.hold_enable();

        let r = std::sync::Arc::clone(&relay);
        let pending = tokio::spawn(async move { r.enable().await });
        tokio::task::yield_now().await;
        assert!(!pending.is_finished());
        assert!(!relay.has_session());

        relay.release_enable();
        assert_eq!(pending.await.unwrap().unwrap(), vec![ACCOUNT]);
        // The gate is not a wallet method and never reaches the wallet.
        assert_eq!(relay.wallet().count(ENABLE), 0);
    }
}
