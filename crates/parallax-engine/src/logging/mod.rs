//! Logging utilities.
//!
//! Centralizes logger initialization. Everything else in the workspace talks to
//! the `log` facade only; `env_logger` is wired up here.

mod init;

pub use init::{init_logging, LoggingConfig};
