//! Shared utilities for the PLSDAO wallet layer.

pub mod logging;

pub use logging::{init_logging, init_tracing, LogFormat};
