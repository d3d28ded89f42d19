//! Router configuration
//!
//! [`RouterConfig`] is loaded through the `switchyard-core`
//! [`AppConfigTrait`](switchyard_core::AppConfigTrait) contract.

pub mod defaults;
pub mod router_config;

pub use defaults::RouterDefaults;
pub use router_config::RouterConfig;
