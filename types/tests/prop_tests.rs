use proptest::prelude::*;

use plsdao_types::address::shorten;
use plsdao_types::{Address, ChainId};

proptest! {
    /// Hex rendering always parses back to the same chain id.
    #[test]
    fn chain_id_hex_parses_back(id in any::<u64>()) {
        let chain = ChainId(id);
        prop_assert_eq!(ChainId::from_hex(&chain.to_hex()).unwrap(), chain);
    }

    /// Hex rendering never carries leading zeros.
    #[test]
    fn chain_id_hex_has_no_leading_zeros(id in 1u64..) {
        let hex = ChainId(id).to_hex();
        prop_assert!(!hex[2..].starts_with('0'));
    }

    /// Decimal strings are accepted as well as hex.
    #[test]
    fn chain_id_accepts_decimal(id in any::<u64>()) {
        prop_assert_eq!(ChainId::from_hex(&id.to_string()).unwrap(), ChainId(id));
    }

    /// A valid address always shortens to 13 characters keeping both ends.
    #[test]
    fn short_address_keeps_ends(hex in "[0-9a-fA-F]{40}") {
        let raw = format!("0x{hex}");
        let addr = Address::parse(raw.clone()).unwrap();
        let short = addr.short();
        prop_assert_eq!(short.len(), 13);
        prop_assert!(short.starts_with(&raw[..6]));
        prop_assert!(short.ends_with(&raw[38..]));
    }

    /// Shortening never panics on arbitrary input.
    #[test]
    fn shorten_is_total(s in ".*") {
        let _ = shorten(&s);
    }

    /// Case never affects address equality.
    #[test]
    fn address_equality_ignores_case(hex in "[0-9a-f]{40}") {
        let lower = Address::parse(format!("0x{hex}")).unwrap();
        let upper = Address::parse(format!("0x{}", hex.to_ascii_uppercase())).unwrap();
        prop_assert_eq!(lower, upper);
    }
}
