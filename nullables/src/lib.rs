//! Nullable infrastructure for deterministic testing.
//!
//! Inspired by the "A-frame architecture" pattern from RsNano.
//! All external dependencies (injected wallet providers, relay sessions,
//! persistent storage) are abstracted behind traits. This crate provides
//! test-friendly implementations that:
//! - Behave like a real wallet by default (authorize, switch, register chains)
//! - Can be scripted to fail, reject or hang programmatically
//! - Record every request for later assertions
//! - Never touch the browser, the relay network, or the filesystem
//!
//! Usage: swap real implementations for nullables in tests.

pub mod provider;
pub mod relay;
pub mod store;

pub use provider::NullProvider;
pub use relay::NullRelayProvider;
pub use store::NullStore;
