//! EVM account address type with `0x` prefix.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::TypesError;

/// Number of leading characters kept by [`Address::short`] (`0x` + 4 hex digits).
const SHORT_PREFIX_LEN: usize = 6;
/// Number of trailing characters kept by [`Address::short`].
const SHORT_SUFFIX_LEN: usize = 4;

/// An account address reported by a wallet backend.
///
/// Always `0x` followed by 40 hex digits. Wallets disagree on casing (some
/// return EIP-55 checksummed addresses, some lowercase), so equality and
/// hashing ignore ASCII case while the original casing is kept for display.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// The standard prefix for all addresses.
    pub const PREFIX: &'static str = "0x";

    /// Number of hex digits after the prefix.
    pub const HEX_LEN: usize = 40;

    /// Parse and validate an address string.
    pub fn parse(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        let hex = s
            .strip_prefix(Self::PREFIX)
            .or_else(|| s.strip_prefix("0X"))
            .ok_or_else(|| TypesError::InvalidAddress(s.clone()))?;
        if hex.len() != Self::HEX_LEN || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(TypesError::InvalidAddress(s));
        }
        Ok(Self(s))
    }

    /// Return the address string exactly as the wallet reported it.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercase form, suitable for keys and comparisons.
    pub fn to_lowercase(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    /// Abbreviated display form, e.g. `0x1234...abcd`.
    pub fn short(&self) -> String {
        shorten(&self.0)
    }
}

/// Abbreviate an address-like string to `0x1234...abcd`.
///
/// Strings too short to abbreviate are returned unchanged.
pub fn shorten(s: &str) -> String {
    if s.len() <= SHORT_PREFIX_LEN + SHORT_SUFFIX_LEN || !s.is_ascii() {
        return s.to_string();
    }
    format!(
        "{}...{}",
        &s[..SHORT_PREFIX_LEN],
        &s[s.len() - SHORT_SUFFIX_LEN..]
    )
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Address {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Address {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<Address> for String {
    fn from(addr: Address) -> Self {
        addr.0
    }
}
