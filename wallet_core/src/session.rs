//! The published view of the connection.

use serde::Serialize;

use plsdao_types::{Address, BackendKind};

use crate::error::ChainError;

/// Coarse connection phase, derived from a [`Session`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    Connecting,
    Connected,
}

/// Snapshot of the connection state, as rendered by the UI.
///
/// Invariants maintained by the connection manager:
/// - `account.is_some()` implies `active_backend.is_some()`
/// - `chain_ok` is false whenever `account` is `None`
/// - `chain_issue` is `None` whenever `chain_ok` is true
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    pub account: Option<Address>,
    pub active_backend: Option<BackendKind>,
    pub chain_ok: bool,
    pub connecting: bool,
    /// The UI should show the wallet picker.
    pub picker_open: bool,
    /// Why the wallet is not on the required chain, when known.
    pub chain_issue: Option<ChainError>,
}

impl Session {
    pub fn phase(&self) -> Phase {
        if self.account.is_some() {
            Phase::Connected
        } else if self.connecting {
            Phase::Connecting
        } else {
            Phase::Idle
        }
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    /// Connected, but not on the required chain.
    pub fn wrong_network(&self) -> bool {
        self.is_connected() && !self.chain_ok
    }

    /// Connected and on the required chain.
    pub fn ready(&self) -> bool {
        self.is_connected() && self.chain_ok
    }

    /// Short label for the connect button.
    pub fn display_name(&self) -> String {
        match (&self.account, self.connecting) {
            (Some(account), _) => account.short(),
            (None, true) => "Connecting...".to_string(),
            (None, false) => "Connect Wallet".to_string(),
        }
    }

    /// Drop everything tied to the current connection.
    pub(crate) fn clear_connection(&mut self) {
        self.account = None;
        self.active_backend = None;
        self.chain_ok = false;
        self.connecting = false;
        self.chain_issue = None;
    }

    pub(crate) fn set_chain_outcome(&mut self, outcome: Result<(), ChainError>) {
        self.chain_ok = outcome.is_ok();
        self.chain_issue = outcome.err();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plsdao_types::ChainId;

    fn connected() -> Session {
        Session {
            account: Some(Address::parse("0x52908400098527886E0F7030069857D2E4169EE7").unwrap()),
            active_backend: Some(BackendKind::MetaMask),
            chain_ok: true,
            ..Session::default()
        }
    }

    #[test]
    fn default_is_idle() {
        let session = Session::default();
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(session.display_name(), "Connect Wallet");
        assert!(!session.wrong_network());
    }

    #[test]
    fn connected_shows_short_address() {
        let session = connected();
        assert_eq!(session.phase(), Phase::Connected);
        assert_eq!(session.display_name(), "0x5290...9EE7");
        assert!(session.ready());
    }

    #[test]
    fn chain_outcome_sets_issue() {
        let mut session = connected();
        session.set_chain_outcome(Err(ChainError::WrongChain {
            actual: ChainId::ETHEREUM,
        }));
        assert!(session.wrong_network());
        assert!(session.chain_issue.is_some());

        session.set_chain_outcome(Ok(()));
        assert!(session.ready());
        assert_eq!(session.chain_issue, None);
    }

    #[test]
    fn clear_connection_keeps_picker_flag() {
        let mut session = connected();
        session.picker_open = true;
        session.clear_connection();
        assert_eq!(session.phase(), Phase::Idle);
        assert!(!session.chain_ok);
        assert!(session.picker_open);
    }
}
