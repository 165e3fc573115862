//! Network assertion: get the connected wallet onto the required chain.
//!
//! 1. Ask the wallet which chain it is on; done if it is the required one.
//! 2. Otherwise ask it to switch.
//! 3. If it does not know the chain, register the full descriptor, then
//!    switch once more if registering did not already move it there.
//! 4. Re-read the chain to confirm.
//!
//! Every failure is reported as a [`ChainError`]; none of them end the
//! connection.

use plsdao_types::{ChainDescriptor, ChainId};

use crate::backend::WalletBackend;
use crate::error::ChainError;

/// Verifies and repairs which chain a backend is on.
#[derive(Clone, Debug)]
pub struct NetworkGuard {
    required: ChainDescriptor,
}

impl NetworkGuard {
    pub fn new(required: ChainDescriptor) -> Self {
        Self { required }
    }

    pub fn is_required(&self, chain: ChainId) -> bool {
        chain == self.required.chain_id
    }

    /// Outcome of observing `chain` without remediation.
    pub fn check(&self, chain: ChainId) -> Result<(), ChainError> {
        if self.is_required(chain) {
            Ok(())
        } else {
            Err(ChainError::WrongChain { actual: chain })
        }
    }

    /// Make sure `backend` is on the required chain, switching or
    /// registering it if needed.
    pub async fn ensure(&self, backend: &dyn WalletBackend) -> Result<(), ChainError> {
        let target = self.required.chain_id;
        let current = backend.chain_id().await.map_err(ChainError::Query)?;
        if self.is_required(current) {
            return Ok(());
        }

        tracing::info!(
            backend = %backend.kind(),
            current = %current,
            required = %target,
            "wallet on wrong chain, requesting switch"
        );
        match backend.switch_chain(target).await {
            Ok(()) => {}
            Err(e) if e.is_unrecognized_chain() => {
                tracing::info!(backend = %backend.kind(), "chain unknown to wallet, registering");
                self.register(backend).await?;
            }
            Err(e) if e.is_user_rejection() => return Err(ChainError::SwitchRejected),
            Err(e) => return Err(ChainError::SwitchFailed(e)),
        }

        let actual = backend.chain_id().await.map_err(ChainError::Query)?;
        self.check(actual)
    }

    async fn register(&self, backend: &dyn WalletBackend) -> Result<(), ChainError> {
        match backend.add_chain(&self.required).await {
            Ok(()) => {}
            Err(e) if e.is_user_rejection() => return Err(ChainError::SwitchRejected),
            Err(e) => return Err(ChainError::RegistrationFailed(e)),
        }

        // Some wallets register the chain without moving to it.
        let current = backend.chain_id().await.map_err(ChainError::Query)?;
        if self.is_required(current) {
            return Ok(());
        }
        match backend.switch_chain(self.required.chain_id).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_user_rejection() => Err(ChainError::SwitchRejected),
            Err(e) => Err(ChainError::SwitchFailed(e)),
        }
    }
}

impl Default for NetworkGuard {
    fn default() -> Self {
        Self::new(ChainDescriptor::pulsechain())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::injected::InjectedBackend;
    use plsdao_nullables::NullProvider;
    use plsdao_provider::rpc::{ETH_CHAIN_ID, WALLET_ADD_CHAIN, WALLET_SWITCH_CHAIN};
    use plsdao_provider::ProviderError;
    use std::sync::Arc;

    const ACCOUNT: &str = "0x52908400098527886e0f7030069857d2e4169ee7";

    fn setup(chain: ChainId) -> (Arc<NullProvider>, InjectedBackend) {
        let provider = Arc::new(NullProvider::new(vec![ACCOUNT], chain));
        let backend = InjectedBackend::generic(provider.clone());
        (provider, backend)
    }

    #[tokio::test]
    async fn already_on_chain_issues_no_requests() {
        let (provider, backend) = setup(ChainId::PULSECHAIN);
        NetworkGuard::default().ensure(&backend).await.unwrap();
        assert_eq!(provider.count(WALLET_SWITCH_CHAIN), 0);
        assert_eq!(provider.count(WALLET_ADD_CHAIN), 0);
        assert_eq!(provider.count(ETH_CHAIN_ID), 1);
    }

    #[tokio::test]
    async fn known_chain_is_switched_to() {
        let (provider, backend) = setup(ChainId::ETHEREUM);
        provider.know_chain(ChainId::PULSECHAIN);
        NetworkGuard::default().ensure(&backend).await.unwrap();
        assert_eq!(provider.chain(), ChainId::PULSECHAIN);
        assert_eq!(provider.count(WALLET_ADD_CHAIN), 0);
    }

    #[tokio::test]
    async fn unknown_chain_is_registered() {
        let (provider, backend) = setup(ChainId::ETHEREUM);
        NetworkGuard::default().ensure(&backend).await.unwrap();
        assert_eq!(provider.count(WALLET_ADD_CHAIN), 1);
        assert_eq!(provider.chain(), ChainId::PULSECHAIN);

        let add = provider
            .requests()
            .into_iter()
            .find(|(m, _)| m == WALLET_ADD_CHAIN)
            .unwrap();
        assert_eq!(add.1[0]["chainId"], "0x171");
        assert_eq!(add.1[0]["nativeCurrency"]["symbol"], "PLS");
    }

    #[tokio::test]
    async fn registration_without_move_switches_again() {
        let (provider, backend) = setup(ChainId::ETHEREUM);
        provider.fail_next(
            WALLET_SWITCH_CHAIN,
            ProviderError::unrecognized_chain("0x171"),
        );
        provider.respond_next(WALLET_ADD_CHAIN, serde_json::Value::Null);
        provider.know_chain(ChainId::PULSECHAIN);

        NetworkGuard::default().ensure(&backend).await.unwrap();
        assert_eq!(provider.count(WALLET_SWITCH_CHAIN), 2);
        assert_eq!(provider.chain(), ChainId::PULSECHAIN);
    }

    #[tokio::test]
    async fn rejected_switch_is_reported() {
        let (provider, backend) = setup(ChainId::ETHEREUM);
        provider.fail_next(WALLET_SWITCH_CHAIN, ProviderError::user_rejected());
        assert_eq!(
            NetworkGuard::default().ensure(&backend).await,
            Err(ChainError::SwitchRejected)
        );
    }

    #[tokio::test]
    async fn rejected_registration_counts_as_switch_rejection() {
        let (provider, backend) = setup(ChainId::ETHEREUM);
        provider.fail_next(WALLET_ADD_CHAIN, ProviderError::user_rejected());
        assert_eq!(
            NetworkGuard::default().ensure(&backend).await,
            Err(ChainError::SwitchRejected)
        );
    }

    #[tokio::test]
    async fn failed_registration_is_distinct() {
        let (provider, backend) = setup(ChainId::ETHEREUM);
        provider.fail_next(WALLET_ADD_CHAIN, ProviderError::internal("bad rpcUrls"));
        assert!(matches!(
            NetworkGuard::default().ensure(&backend).await,
            Err(ChainError::RegistrationFailed(_))
        ));
    }

    #[tokio::test]
    async fn switch_that_does_not_stick_is_wrong_chain() {
        let (provider, backend) = setup(ChainId::ETHEREUM);
        provider.respond_next(WALLET_SWITCH_CHAIN, serde_json::Value::Null);
        assert_eq!(
            NetworkGuard::default().ensure(&backend).await,
            Err(ChainError::WrongChain {
                actual: ChainId::ETHEREUM
            })
        );
    }

    #[tokio::test]
    async fn query_failure_is_reported() {
        let (provider, backend) = setup(ChainId::PULSECHAIN);
        provider.fail_next(ETH_CHAIN_ID, ProviderError::disconnected());
        assert!(matches!(
            NetworkGuard::default().ensure(&backend).await,
            Err(ChainError::Query(_))
        ));
    }
}
