//! # switchyard-core
//!
//! Configuration foundation shared by the switchyard crates: the
//! [`AppConfigTrait`] contract, environment helpers, config source tracking
//! and the validators used by the router configuration.

pub mod config;

pub use config::validation::{
    CaptureRegexValidator, ConfigError, ConfigValidator, IdentifierValidator, UrlValidator,
};
pub use config::{
    env_list_or_default, get_env_or_default, AppConfigTrait, ConfigSource, Environment,
};
