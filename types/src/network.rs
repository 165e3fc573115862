//! Chain identifiers and the descriptor used to register a chain with a wallet.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypesError;

/// Highest decimals value a wallet will accept for a native currency.
const MAX_DECIMALS: u8 = 36;

/// Numeric EVM chain identifier (EIP-155).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl ChainId {
    /// PulseChain mainnet.
    pub const PULSECHAIN: ChainId = ChainId(369);

    /// Ethereum mainnet.
    pub const ETHEREUM: ChainId = ChainId(1);

    /// `0x`-prefixed lowercase hex without leading zeros, as wallets expect it.
    pub fn to_hex(self) -> String {
        format!("{:#x}", self.0)
    }

    /// Parse the chain id format wallets report.
    ///
    /// Accepts `0x`/`0X` hex and plain decimal strings; some injected wallets
    /// still emit decimal `chainChanged` payloads.
    pub fn from_hex(s: &str) -> Result<Self, TypesError> {
        let trimmed = s.trim();
        let parsed = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(hex) if !hex.is_empty() => u64::from_str_radix(hex, 16),
            Some(_) => return Err(TypesError::InvalidChainId(s.to_string())),
            None => trimmed.parse::<u64>(),
        };
        parsed
            .map(ChainId)
            .map_err(|_| TypesError::InvalidChainId(s.to_string()))
    }

    /// Parse a JSON value that may be a hex string or a bare number.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, TypesError> {
        match value {
            serde_json::Value::String(s) => Self::from_hex(s),
            serde_json::Value::Number(n) => n
                .as_u64()
                .map(ChainId)
                .ok_or_else(|| TypesError::InvalidChainId(n.to_string())),
            other => Err(TypesError::InvalidChainId(other.to_string())),
        }
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Native currency of a chain, as shown by the wallet.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Everything a wallet needs to register an unknown chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDescriptor {
    pub chain_id: ChainId,
    pub chain_name: String,
    pub rpc_urls: Vec<String>,
    #[serde(default)]
    pub block_explorer_urls: Vec<String>,
    pub native_currency: NativeCurrency,
}

impl ChainDescriptor {
    /// The chain this application requires: PulseChain mainnet.
    pub fn pulsechain() -> Self {
        Self {
            chain_id: ChainId::PULSECHAIN,
            chain_name: "PulseChain".to_string(),
            native_currency: NativeCurrency {
                name: "PLS".to_string(),
                symbol: "PLS".to_string(),
                decimals: 18,
            },
            rpc_urls: vec!["https://rpc.pulsechain.com".to_string()],
            block_explorer_urls: vec!["https://scan.pulsechain.com".to_string()],
        }
    }

    /// Check the descriptor is something a wallet could accept.
    pub fn validate(&self) -> Result<(), TypesError> {
        if self.chain_name.trim().is_empty() {
            return Err(TypesError::InvalidDescriptor("empty chain name".into()));
        }
        if self.rpc_urls.iter().all(|u| u.trim().is_empty()) {
            return Err(TypesError::InvalidDescriptor("no RPC endpoints".into()));
        }
        if self.native_currency.symbol.trim().is_empty() {
            return Err(TypesError::InvalidDescriptor("empty currency symbol".into()));
        }
        if self.native_currency.decimals > MAX_DECIMALS {
            return Err(TypesError::InvalidDescriptor(format!(
                "decimals {} exceeds {MAX_DECIMALS}",
                self.native_currency.decimals
            )));
        }
        Ok(())
    }

    /// The parameter object for `wallet_addEthereumChain` (EIP-3085).
    pub fn to_add_chain_params(&self) -> serde_json::Value {
        serde_json::json!({
            "chainId": self.chain_id.to_hex(),
            "chainName": self.chain_name,
            "nativeCurrency": {
                "name": self.native_currency.name,
                "symbol": self.native_currency.symbol,
                "decimals": self.native_currency.decimals,
            },
            "rpcUrls": self.rpc_urls,
            "blockExplorerUrls": self.block_explorer_urls,
        })
    }
}

impl Default for ChainDescriptor {
    fn default() -> Self {
        Self::pulsechain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pulsechain_hex_id() {
        assert_eq!(ChainId::PULSECHAIN.to_hex(), "0x171");
        assert_eq!(ChainId::ETHEREUM.to_hex(), "0x1");
    }

    #[test]
    fn parses_hex_and_decimal() {
        assert_eq!(ChainId::from_hex("0x171").unwrap(), ChainId(369));
        assert_eq!(ChainId::from_hex("0X171").unwrap(), ChainId(369));
        assert_eq!(ChainId::from_hex("369").unwrap(), ChainId(369));
        assert!(ChainId::from_hex("0x").is_err());
        assert!(ChainId::from_hex("pulse").is_err());
    }

    #[test]
    fn parses_json_number_and_string() {
        assert_eq!(
            ChainId::from_json(&serde_json::json!(369)).unwrap(),
            ChainId(369)
        );
        assert_eq!(
            ChainId::from_json(&serde_json::json!("0x171")).unwrap(),
            ChainId(369)
        );
        assert!(ChainId::from_json(&serde_json::json!(null)).is_err());
    }

    #[test]
    fn add_chain_params_use_wallet_field_names() {
        let params = ChainDescriptor::pulsechain().to_add_chain_params();
        assert_eq!(params["chainId"], "0x171");
        assert_eq!(params["chainName"], "PulseChain");
        assert_eq!(params["nativeCurrency"]["decimals"], 18);
        assert_eq!(params["rpcUrls"][0], "https://rpc.pulsechain.com");
        assert_eq!(params["blockExplorerUrls"][0], "https://scan.pulsechain.com");
    }

    #[test]
    fn validate_rejects_missing_rpc() {
        let mut descriptor = ChainDescriptor::pulsechain();
        assert!(descriptor.validate().is_ok());
        descriptor.rpc_urls.clear();
        assert!(matches!(
            descriptor.validate(),
            Err(TypesError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn validate_rejects_absurd_decimals() {
        let mut descriptor = ChainDescriptor::pulsechain();
        descriptor.native_currency.decimals = 77;
        assert!(descriptor.validate().is_err());
    }
}
