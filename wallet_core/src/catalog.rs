//! What the wallet picker shows: available backends, install hints, and
//! deep links into mobile wallets for relay pairing.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::Serialize;

use plsdao_types::BackendKind;

use crate::backend::BackendSet;

/// How a backend reaches the wallet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Browser extension in the same page.
    Browser,
    /// Wallet app on another device, through a relay.
    Mobile,
}

/// One entry in the wallet picker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WalletOption {
    pub kind: BackendKind,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub transport: Transport,
    pub available: bool,
    /// Install link, only for unavailable wallets that have one.
    pub download_url: Option<&'static str>,
}

/// Install link for a backend, if it has one.
pub fn download_url(kind: BackendKind) -> Option<&'static str> {
    match kind {
        BackendKind::MetaMask => Some("https://metamask.io/download/"),
        BackendKind::Coinbase => Some("https://wallet.coinbase.com/"),
        BackendKind::WalletConnect | BackendKind::Injected => None,
    }
}

fn describe(kind: BackendKind) -> (&'static str, &'static str, Transport) {
    match kind {
        BackendKind::MetaMask => ("Connect using browser extension", "🦊", Transport::Browser),
        BackendKind::WalletConnect => ("Connect with mobile wallets", "📱", Transport::Mobile),
        BackendKind::Coinbase => ("Connect using Coinbase Wallet", "🔵", Transport::Browser),
        BackendKind::Injected => ("Connect any injected wallet", "🔗", Transport::Browser),
    }
}

/// Picker entries for `backends`, in picker order.
///
/// Every named wallet is listed (unavailable ones with their install link);
/// the generic injected entry only appears when such a wallet is present.
pub fn options(backends: &BackendSet) -> Vec<WalletOption> {
    BackendKind::ALL
        .iter()
        .filter_map(|&kind| {
            let available = backends
                .get(kind)
                .map(|b| b.is_available())
                .unwrap_or(false);
            if kind == BackendKind::Injected && !available {
                return None;
            }
            let (description, icon, transport) = describe(kind);
            Some(WalletOption {
                kind,
                name: kind.display_name(),
                description,
                icon,
                transport,
                available,
                download_url: if available { None } else { download_url(kind) },
            })
        })
        .collect()
}

/// A mobile wallet that can pair over the relay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct MobileWallet {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub download_url: &'static str,
}

pub const MOBILE_WALLETS: [MobileWallet; 6] = [
    MobileWallet {
        id: "trust",
        name: "Trust Wallet",
        icon: "🛡️",
        download_url: "https://trustwallet.com/download",
    },
    MobileWallet {
        id: "rainbow",
        name: "Rainbow",
        icon: "🌈",
        download_url: "https://rainbow.me/download",
    },
    MobileWallet {
        id: "metamask-mobile",
        name: "MetaMask Mobile",
        icon: "🦊",
        download_url: "https://metamask.io/download/",
    },
    MobileWallet {
        id: "coinbase-mobile",
        name: "Coinbase Wallet",
        icon: "🔵",
        download_url: "https://wallet.coinbase.com/",
    },
    MobileWallet {
        id: "imtoken",
        name: "imToken",
        icon: "💎",
        download_url: "https://token.im/download",
    },
    MobileWallet {
        id: "tokenpocket",
        name: "TokenPocket",
        icon: "🎒",
        download_url: "https://tokenpocket.pro/download",
    },
];

/// What a browser's `encodeURIComponent` leaves unescaped.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn deep_link_base(wallet_id: &str) -> Option<&'static str> {
    match wallet_id {
        "trust" => Some("trust://wc"),
        "rainbow" => Some("rainbow://wc"),
        "metamask" | "metamask-mobile" => Some("metamask://wc"),
        "coinbase" | "coinbase-mobile" => Some("cbwallet://wc"),
        "imtoken" => Some("imtokenv2://wc"),
        "tokenpocket" => Some("tpoutside://wc"),
        _ => None,
    }
}

/// Deep link that opens `wallet_id` with the relay pairing `uri`.
///
/// Unknown wallets get the bare pairing URI back, which any relay-capable
/// wallet can scan.
pub fn mobile_deep_link(wallet_id: &str, uri: &str) -> String {
    match deep_link_base(wallet_id) {
        Some(base) => format!("{base}?uri={}", utf8_percent_encode(uri, URI_COMPONENT)),
        None => uri.to_string(),
    }
}

const MOBILE_UA_MARKERS: [&str; 8] = [
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// Whether a browser user agent belongs to a mobile device.
pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    MOBILE_UA_MARKERS.iter().any(|m| ua.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use plsdao_nullables::{NullProvider, NullRelayProvider};
    use plsdao_provider::{Eip1193Provider, RelayProvider};
    use plsdao_types::ChainId;
    use std::sync::Arc;

    const ACCOUNT: &str = "0x52908400098527886e0f7030069857d2e4169ee7";

    fn relay() -> Arc<dyn RelayProvider> {
        Arc::new(NullRelayProvider::new(vec![ACCOUNT], ChainId::PULSECHAIN))
    }

    #[test]
    fn metamask_host_lists_coinbase_with_install_link() {
        let injected: Arc<dyn Eip1193Provider> =
            Arc::new(NullProvider::metamask(vec![ACCOUNT], ChainId::PULSECHAIN));
        let opts = options(&BackendSet::from_host(Some(injected), Some(relay())));

        let kinds: Vec<_> = opts.iter().map(|o| o.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BackendKind::MetaMask,
                BackendKind::WalletConnect,
                BackendKind::Coinbase
            ]
        );
        assert!(opts[0].available);
        assert_eq!(opts[0].download_url, None);
        assert!(!opts[2].available);
        assert_eq!(opts[2].download_url, Some("https://wallet.coinbase.com/"));
        assert_eq!(opts[1].transport, Transport::Mobile);
    }

    #[test]
    fn other_injected_wallet_gets_generic_entry() {
        let injected: Arc<dyn Eip1193Provider> =
            Arc::new(NullProvider::new(vec![ACCOUNT], ChainId::PULSECHAIN));
        let opts = options(&BackendSet::from_host(Some(injected), Some(relay())));
        let generic = opts.iter().find(|o| o.kind == BackendKind::Injected).unwrap();
        assert!(generic.available);
        assert_eq!(generic.name, "Other Wallet");
    }

    #[test]
    fn bare_host_offers_install_links() {
        let opts = options(&BackendSet::from_host(None, None));
        assert_eq!(opts.len(), 3);
        assert!(opts.iter().all(|o| !o.available));
        assert_eq!(opts[0].download_url, Some("https://metamask.io/download/"));
    }

    #[test]
    fn deep_link_encodes_pairing_uri() {
        let link = mobile_deep_link("trust", "wc:abc@2?relay-protocol=irn&symKey=xyz");
        assert_eq!(
            link,
            "trust://wc?uri=wc%3Aabc%402%3Frelay-protocol%3Dirn%26symKey%3Dxyz"
        );
    }

    #[test]
    fn deep_link_escapes_like_a_browser() {
        assert_eq!(
            mobile_deep_link("trust", "wc:a b~!'()*"),
            "trust://wc?uri=wc%3Aa%20b~!'()*"
        );
        assert_eq!(
            mobile_deep_link("rainbow", "wc:ü/x"),
            "rainbow://wc?uri=wc%3A%C3%BC%2Fx"
        );
    }

    #[test]
    fn every_listed_mobile_wallet_has_a_deep_link() {
        for wallet in MOBILE_WALLETS {
            assert!(
                mobile_deep_link(wallet.id, "wc:x").contains("://wc?uri="),
                "{} has no deep link",
                wallet.id
            );
        }
    }

    #[test]
    fn unknown_wallet_gets_raw_uri() {
        assert_eq!(mobile_deep_link("zerion", "wc:abc@2"), "wc:abc@2");
    }

    #[test]
    fn detects_mobile_user_agents() {
        assert!(is_mobile_user_agent(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)"
        ));
        assert!(is_mobile_user_agent("Opera/9.80 (J2ME/MIDP; Opera Mini/9.80)"));
        assert!(!is_mobile_user_agent(
            "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36"
        ));
    }
}
