use crate::config::ConfigError;
use std::env;

/// Configuration source information for debugging and hot-reload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Value loaded from environment variable
    EnvVar(String),
    /// Default value used
    Default(String),
    /// Value provided programmatically
    Programmatic,
}

impl ConfigSource {
    /// Source for a field backed by `var`, falling back to `default`
    pub fn env_or_default(var: &str, default: impl Into<String>) -> Self {
        if env::var(var).is_ok() {
            ConfigSource::EnvVar(var.to_string())
        } else {
            ConfigSource::Default(default.into())
        }
    }

    pub fn is_env_var(&self) -> bool {
        matches!(self, ConfigSource::EnvVar(_))
    }

    pub fn is_default(&self) -> bool {
        matches!(self, ConfigSource::Default(_))
    }

    /// Get source description
    pub fn description(&self) -> String {
        match self {
            ConfigSource::EnvVar(var) => format!("Environment variable: {}", var),
            ConfigSource::Default(value) => format!("Default value: {}", value),
            ConfigSource::Programmatic => "Programmatically set".to_string(),
        }
    }
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Read an environment variable, falling back to `default` when unset
pub fn get_env_or_default(var: &str, default: &str) -> Result<String, ConfigError> {
    match env::var(var) {
        Ok(value) => Ok(value),
        Err(env::VarError::NotPresent) => Ok(default.to_string()),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::environment_error(format!(
            "{} is not valid unicode",
            var
        ))),
    }
}

/// Read a comma separated list from the environment.
///
/// Items are trimmed and empty items are skipped, so `"GET, ,POST"` yields
/// `["GET", "POST"]`.
pub fn env_list_or_default(var: &str, default: &[&str]) -> Result<Vec<String>, ConfigError> {
    match env::var(var) {
        Ok(value) => Ok(value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()),
        Err(env::VarError::NotPresent) => Ok(default.iter().map(|s| s.to_string()).collect()),
        Err(env::VarError::NotUnicode(_)) => Err(ConfigError::environment_error(format!(
            "{} is not valid unicode",
            var
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_env_list_splits_and_trims() {
        env::set_var("SWITCHYARD_TEST_LIST", "GET, ,post , PUT");
        let list = env_list_or_default("SWITCHYARD_TEST_LIST", &["DELETE"]).unwrap();
        assert_eq!(list, vec!["GET", "post", "PUT"]);
        env::remove_var("SWITCHYARD_TEST_LIST");

        let list = env_list_or_default("SWITCHYARD_TEST_LIST", &["DELETE"]).unwrap();
        assert_eq!(list, vec!["DELETE"]);
    }

    #[test]
    #[serial]
    fn test_config_source_reports_env_var() {
        env::set_var("SWITCHYARD_TEST_SOURCE", "1");
        assert!(ConfigSource::env_or_default("SWITCHYARD_TEST_SOURCE", "0").is_env_var());
        env::remove_var("SWITCHYARD_TEST_SOURCE");
        assert!(ConfigSource::env_or_default("SWITCHYARD_TEST_SOURCE", "0").is_default());
    }
}
