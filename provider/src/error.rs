//! Provider RPC errors (EIP-1193 / EIP-1474 codes).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An error returned by a wallet provider.
///
/// Wallets signal distinct conditions only through the numeric code, so the
/// code is kept verbatim and interpreted through the `is_*` helpers.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("provider error {code}: {message}")]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
}

impl ProviderError {
    /// The user rejected the request.
    pub const USER_REJECTED: i64 = 4001;
    /// The requested method and/or account has not been authorized by the user.
    pub const UNAUTHORIZED: i64 = 4100;
    /// The provider does not support the requested method.
    pub const UNSUPPORTED_METHOD: i64 = 4200;
    /// The provider is disconnected from all chains.
    pub const DISCONNECTED: i64 = 4900;
    /// The provider is not connected to the requested chain.
    pub const CHAIN_DISCONNECTED: i64 = 4901;
    /// The wallet does not know the requested chain (`wallet_switchEthereumChain`).
    pub const UNRECOGNIZED_CHAIN: i64 = 4902;
    /// A request of the same kind is already awaiting the user.
    pub const REQUEST_PENDING: i64 = -32002;
    /// Internal JSON-RPC error.
    pub const INTERNAL: i64 = -32603;

    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn user_rejected() -> Self {
        Self::new(Self::USER_REJECTED, "User rejected the request.")
    }

    pub fn unrecognized_chain(chain_hex: &str) -> Self {
        Self::new(
            Self::UNRECOGNIZED_CHAIN,
            format!("Unrecognized chain ID \"{chain_hex}\"."),
        )
    }

    pub fn disconnected() -> Self {
        Self::new(Self::DISCONNECTED, "The provider is disconnected.")
    }

    /// A malformed response or other failure inside the provider bridge.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Self::INTERNAL, message)
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == Self::USER_REJECTED
    }

    pub fn is_unrecognized_chain(&self) -> bool {
        self.code == Self::UNRECOGNIZED_CHAIN
    }

    /// Decode an error object as delivered by a provider (`{code, message}`).
    pub fn from_json(value: &serde_json::Value) -> Self {
        let code = value
            .get("code")
            .and_then(|c| c.as_i64())
            .unwrap_or(Self::INTERNAL);
        let message = value
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("unknown provider error")
            .to_string();
        Self { code, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_codes() {
        assert!(ProviderError::user_rejected().is_user_rejection());
        assert!(ProviderError::unrecognized_chain("0x171").is_unrecognized_chain());
        assert!(!ProviderError::internal("boom").is_user_rejection());
    }

    #[test]
    fn decodes_error_object() {
        let err = ProviderError::from_json(&serde_json::json!({
            "code": 4902,
            "message": "Unrecognized chain ID \"0x171\"."
        }));
        assert!(err.is_unrecognized_chain());
    }

    #[test]
    fn missing_fields_fall_back_to_internal() {
        let err = ProviderError::from_json(&serde_json::json!({}));
        assert_eq!(err.code, ProviderError::INTERNAL);
    }
}
