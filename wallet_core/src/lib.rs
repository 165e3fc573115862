//! Wallet connection layer for the PLSDAO app.
//!
//! Provides everything the UI needs to talk to a user's wallet:
//! - Backend adapters over injected browser wallets and relay sessions
//! - The wallet picker catalog (availability, install links, mobile deep links)
//! - The connection manager: connect, disconnect, silent reconnect
//! - Network assertion onto PulseChain (switch, or register then switch)
//! - Persistence of the last used backend
//!
//! The UI renders from the [`Session`] snapshots the [`ConnectionManager`]
//! publishes and never talks to a backend directly.

pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod injected;
pub mod manager;
pub mod network;
pub mod persistence;
pub mod relay;
pub mod session;

pub use backend::{BackendEvent, BackendListener, BackendSet, WalletBackend};
pub use catalog::{MobileWallet, Transport, WalletOption, MOBILE_WALLETS};
pub use config::WalletConfig;
pub use error::{ChainError, WalletError};
pub use injected::InjectedBackend;
pub use manager::ConnectionManager;
pub use network::NetworkGuard;
pub use persistence::{SessionStore, LAST_BACKEND_KEY};
pub use relay::RelayBackend;
pub use session::{Phase, Session};
