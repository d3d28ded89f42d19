use crate::config::{ConfigError, ConfigSource};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::str::FromStr;

/// Environment variable holding the deployment environment name
pub const ENVIRONMENT_VAR: &str = "SWITCHYARD_ENV";

/// Configuration contract implemented by every switchyard configuration struct
pub trait AppConfigTrait: Sized {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self, ConfigError>;

    /// Validate the configuration
    fn validate(&self) -> Result<(), ConfigError>;

    /// Get configuration source information for debugging
    fn config_sources(&self) -> HashMap<String, ConfigSource>;
}

/// Deployment environment the host application runs in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Testing,
    Production,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testing" | "test" => Ok(Environment::Testing),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::invalid_value(
                "environment",
                s,
                "development, testing, or production",
            )),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let env_str = match self {
            Environment::Development => "development",
            Environment::Testing => "testing",
            Environment::Production => "production",
        };
        write!(f, "{}", env_str)
    }
}

impl Environment {
    /// Read the environment from `SWITCHYARD_ENV`, defaulting to development
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var(ENVIRONMENT_VAR) {
            Ok(value) => value.parse(),
            Err(env::VarError::NotPresent) => {
                tracing::debug!(
                    target: "switchyard::config",
                    var = ENVIRONMENT_VAR,
                    "Environment not set, defaulting to development"
                );
                Ok(Environment::Development)
            }
            Err(env::VarError::NotUnicode(_)) => Err(ConfigError::environment_error(format!(
                "{} is not valid unicode",
                ENVIRONMENT_VAR
            ))),
        }
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Environment::Development)
    }

    pub fn is_testing(&self) -> bool {
        matches!(self, Environment::Testing)
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_environment_parsing_accepts_aliases() {
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!("TEST".parse::<Environment>().unwrap(), Environment::Testing);
        assert_eq!(" prod ".parse::<Environment>().unwrap(), Environment::Production);
        assert!("staging".parse::<Environment>().is_err());
    }

    #[test]
    #[serial]
    fn test_environment_from_env_defaults_to_development() {
        env::remove_var(ENVIRONMENT_VAR);
        assert_eq!(Environment::from_env().unwrap(), Environment::Development);

        env::set_var(ENVIRONMENT_VAR, "production");
        assert!(Environment::from_env().unwrap().is_production());
        env::remove_var(ENVIRONMENT_VAR);
    }
}
