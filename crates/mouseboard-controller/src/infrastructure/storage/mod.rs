//! Storage infrastructure: configuration file loading.
//!
//! The `config` sub-module reads the TOML configuration file from the
//! platform config directory (or an explicit path), fills in defaults for
//! anything missing, and validates the result before the controller opens
//! any device.

pub mod config;
