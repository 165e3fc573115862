//! Fundamental types for the PLSDAO wallet layer.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! account addresses, chain identifiers, the required chain descriptor, and the
//! wallet backend identifiers.

pub mod address;
pub mod backend;
pub mod error;
pub mod network;

pub use address::Address;
pub use backend::BackendKind;
pub use error::TypesError;
pub use network::{ChainDescriptor, ChainId, NativeCurrency};
