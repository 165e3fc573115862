//! The wallet provider surface the PLSDAO wallet layer talks to.
//!
//! Injected browser wallets and relay bridges all speak EIP-1193: a single
//! `request(method, params)` entry point plus `on`/`off` event subscription.
//! This crate defines that surface as traits so the host environment (a
//! wasm bridge to `window.ethereum`, a relay SDK, or a test fake) can be
//! injected, and adds typed helpers for the handful of JSON-RPC methods the
//! wallet layer uses.

pub mod eip1193;
pub mod error;
pub mod event;
pub mod rpc;

pub use eip1193::{Eip1193Provider, RelayProvider};
pub use error::ProviderError;
pub use event::{Listener, ListenerId, ProviderEvent, ProviderEventKind};
