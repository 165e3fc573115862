//! Abstract key-value persistence for the PLSDAO wallet layer.
//!
//! The wallet layer only ever persists a handful of small string values (the
//! last used wallet backend), so the surface is a plain string key-value
//! store. Every backend (JSON file, browser local storage, in-memory for
//! testing) implements [`KeyValueStore`]; the rest of the codebase depends
//! only on the trait.

pub mod error;
pub mod file;
pub mod kv;

pub use error::StoreError;
pub use file::FileStore;
pub use kv::KeyValueStore;
