//! Typed wrappers around the JSON-RPC methods the wallet layer uses.

use plsdao_types::{ChainDescriptor, ChainId};

use crate::{Eip1193Provider, ProviderError};

pub const ETH_REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
pub const ETH_ACCOUNTS: &str = "eth_accounts";
pub const ETH_CHAIN_ID: &str = "eth_chainId";
pub const WALLET_SWITCH_CHAIN: &str = "wallet_switchEthereumChain";
pub const WALLET_ADD_CHAIN: &str = "wallet_addEthereumChain";

/// Prompt the user to authorize accounts.
pub async fn request_accounts<P: Eip1193Provider + ?Sized>(
    provider: &P,
) -> Result<Vec<String>, ProviderError> {
    let result = provider
        .request(ETH_REQUEST_ACCOUNTS, serde_json::json!([]))
        .await?;
    decode_accounts(ETH_REQUEST_ACCOUNTS, result)
}

/// Already-authorized accounts; never prompts.
pub async fn accounts<P: Eip1193Provider + ?Sized>(provider: &P) -> Result<Vec<String>, ProviderError> {
    let result = provider.request(ETH_ACCOUNTS, serde_json::json!([])).await?;
    decode_accounts(ETH_ACCOUNTS, result)
}

/// The chain the provider is currently on.
pub async fn chain_id<P: Eip1193Provider + ?Sized>(provider: &P) -> Result<ChainId, ProviderError> {
    let result = provider.request(ETH_CHAIN_ID, serde_json::json!([])).await?;
    ChainId::from_json(&result).map_err(|e| malformed(ETH_CHAIN_ID, e))
}

/// Ask the wallet to switch to `chain`.
///
/// Fails with [`ProviderError::UNRECOGNIZED_CHAIN`] when the wallet does not
/// know the chain yet.
pub async fn switch_chain<P: Eip1193Provider + ?Sized>(
    provider: &P,
    chain: ChainId,
) -> Result<(), ProviderError> {
    tracing::debug!(chain = %chain, "requesting chain switch");
    provider
        .request(
            WALLET_SWITCH_CHAIN,
            serde_json::json!([{ "chainId": chain.to_hex() }]),
        )
        .await?;
    Ok(())
}

/// Ask the wallet to register a chain.
pub async fn add_chain<P: Eip1193Provider + ?Sized>(
    provider: &P,
    descriptor: &ChainDescriptor,
) -> Result<(), ProviderError> {
    tracing::debug!(chain = %descriptor.chain_id, name = %descriptor.chain_name, "requesting chain registration");
    provider
        .request(
            WALLET_ADD_CHAIN,
            serde_json::json!([descriptor.to_add_chain_params()]),
        )
        .await?;
    Ok(())
}

fn decode_accounts(
    method: &str,
    result: serde_json::Value,
) -> Result<Vec<String>, ProviderError> {
    serde_json::from_value(result).map_err(|e| malformed(method, e))
}

fn malformed(method: &str, err: impl std::fmt::Display) -> ProviderError {
    tracing::warn!(method, "malformed provider response: {err}");
    ProviderError::internal(format!("invalid {method} response: {err}"))
}
