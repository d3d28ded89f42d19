//! Tracing setup for hosts embedding the router
//!
//! The router itself only emits `tracing` events under the `switchyard::*`
//! targets; installing a subscriber is left to the host, which may use
//! [`init_logging`] with one of the [`LoggingConfig`] presets.

pub mod config;

pub use config::{init_logging, LoggingConfig, LoggingFormat};
