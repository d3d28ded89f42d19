//! Router configuration
//!
//! Provides the configuration consumed by registries, route tables and
//! dispatchers, integrating with the switchyard-core configuration system.

use super::defaults::RouterDefaults;
use crate::routing::{HttpMethod, Position};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use switchyard_core::{
    env_list_or_default, get_env_or_default, AppConfigTrait, CaptureRegexValidator, ConfigError,
    ConfigSource, ConfigValidator, IdentifierValidator, UrlValidator,
};

const ALLOWED_METHODS_VAR: &str = "SWITCHYARD_ALLOWED_METHODS";
const ROUTE_QUERY_VAR_VAR: &str = "SWITCHYARD_ROUTE_QUERY_VAR";
const DEFAULT_POSITION_VAR: &str = "SWITCHYARD_DEFAULT_POSITION";

/// Route registry and dispatch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Methods a declaration may use; anything else is dropped
    pub allowed_methods: Vec<String>,
    /// Host query variable carrying the matched rewrite route
    pub route_query_var: String,
    /// Capture expression substituted for each path parameter
    pub param_capture: String,
    /// Script the rewrite target query string is appended to
    pub rewrite_target: String,
    /// Rule position used when a route does not choose one
    pub default_position: Position,
    /// Namespace for REST routes outside any namespaced group
    pub global_namespace: String,
    /// Script variable the exposed REST routes are assigned to
    pub expose_var: String,
    /// Base URL for rewrite route URLs
    pub home_url: String,
    /// Base URL for REST route URLs
    pub rest_url: String,
    /// Reject declarations whose methods are all disallowed
    pub strict_methods: bool,
    /// Reject tables referencing unregistered middleware names
    pub strict_middleware: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            allowed_methods: RouterDefaults::ALLOWED_METHODS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            route_query_var: RouterDefaults::ROUTE_QUERY_VAR.to_string(),
            param_capture: RouterDefaults::PARAM_CAPTURE.to_string(),
            rewrite_target: RouterDefaults::REWRITE_TARGET.to_string(),
            default_position: Position::Top,
            global_namespace: RouterDefaults::GLOBAL_NAMESPACE.to_string(),
            expose_var: RouterDefaults::EXPOSE_VAR.to_string(),
            home_url: RouterDefaults::HOME_URL.to_string(),
            rest_url: RouterDefaults::REST_URL.to_string(),
            strict_methods: RouterDefaults::STRICT_METHODS,
            strict_middleware: RouterDefaults::STRICT_MIDDLEWARE,
        }
    }
}

impl AppConfigTrait for RouterConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.allowed_methods.is_empty() {
            return Err(ConfigError::validation_failed(
                "At least one allowed method is required",
            ));
        }

        for method in &self.allowed_methods {
            method.parse::<HttpMethod>().map_err(|_| {
                ConfigError::invalid_value("allowed_methods", method, "known HTTP method name")
            })?;
        }

        IdentifierValidator.validate("route_query_var", self.route_query_var.as_str())?;
        CaptureRegexValidator::default().validate("param_capture", self.param_capture.as_str())?;

        if self.rewrite_target.is_empty() {
            return Err(ConfigError::validation_failed(
                "Rewrite target must be non-empty",
            ));
        }

        if self.global_namespace.trim_matches('/').is_empty() {
            return Err(ConfigError::validation_failed(
                "Global namespace must be non-empty",
            ));
        }

        IdentifierValidator.validate("expose_var", self.expose_var.as_str())?;

        let urls = UrlValidator::default();
        urls.validate("home_url", self.home_url.as_str())?;
        urls.validate("rest_url", self.rest_url.as_str())?;

        Ok(())
    }

    fn from_env() -> Result<Self, ConfigError> {
        let allowed_methods =
            env_list_or_default(ALLOWED_METHODS_VAR, RouterDefaults::ALLOWED_METHODS)?
                .into_iter()
                .map(|m| m.to_uppercase())
                .collect();

        let route_query_var =
            get_env_or_default(ROUTE_QUERY_VAR_VAR, RouterDefaults::ROUTE_QUERY_VAR)?;

        let default_position =
            get_env_or_default(DEFAULT_POSITION_VAR, RouterDefaults::DEFAULT_POSITION)?
                .parse::<Position>()
                .map_err(|_| ConfigError::InvalidValue {
                    field: "default_position".to_string(),
                    value: env::var(DEFAULT_POSITION_VAR).unwrap_or_default(),
                    expected: "top or bottom".to_string(),
                })?;

        let config = RouterConfig {
            allowed_methods,
            route_query_var,
            default_position,
            ..RouterConfig::default()
        };
        config.validate()?;
        Ok(config)
    }

    fn config_sources(&self) -> HashMap<String, ConfigSource> {
        let mut sources = HashMap::new();
        sources.insert(
            "allowed_methods".to_string(),
            ConfigSource::env_or_default(
                ALLOWED_METHODS_VAR,
                RouterDefaults::ALLOWED_METHODS.join(","),
            ),
        );
        sources.insert(
            "route_query_var".to_string(),
            ConfigSource::env_or_default(ROUTE_QUERY_VAR_VAR, RouterDefaults::ROUTE_QUERY_VAR),
        );
        sources.insert(
            "default_position".to_string(),
            ConfigSource::env_or_default(DEFAULT_POSITION_VAR, RouterDefaults::DEFAULT_POSITION),
        );
        for (field, default) in [
            ("param_capture", RouterDefaults::PARAM_CAPTURE),
            ("rewrite_target", RouterDefaults::REWRITE_TARGET),
            ("global_namespace", RouterDefaults::GLOBAL_NAMESPACE),
            ("expose_var", RouterDefaults::EXPOSE_VAR),
            ("home_url", RouterDefaults::HOME_URL),
            ("rest_url", RouterDefaults::REST_URL),
        ] {
            sources.insert(field.to_string(), ConfigSource::Default(default.to_string()));
        }
        sources
    }
}

impl RouterConfig {
    /// Parsed allowed methods, in configured order
    pub fn allowed(&self) -> Vec<HttpMethod> {
        let mut methods = Vec::new();
        for method in self
            .allowed_methods
            .iter()
            .filter_map(|m| m.parse::<HttpMethod>().ok())
        {
            if !methods.contains(&method) {
                methods.push(method);
            }
        }
        methods
    }

    pub fn with_home_url(mut self, url: impl Into<String>) -> Self {
        self.home_url = url.into();
        self
    }

    pub fn with_rest_url(mut self, url: impl Into<String>) -> Self {
        self.rest_url = url.into();
        self
    }

    pub fn with_default_position(mut self, position: Position) -> Self {
        self.default_position = position;
        self
    }

    pub fn with_global_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.global_namespace = namespace.into();
        self
    }

    pub fn strict(mut self) -> Self {
        self.strict_methods = true;
        self.strict_middleware = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        env::remove_var(ALLOWED_METHODS_VAR);
        env::remove_var(ROUTE_QUERY_VAR_VAR);
        env::remove_var(DEFAULT_POSITION_VAR);
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = RouterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.route_query_var, "mtwp_route");
        assert_eq!(config.default_position, Position::Top);
        assert_eq!(
            config.allowed(),
            vec![
                HttpMethod::GET,
                HttpMethod::POST,
                HttpMethod::PUT,
                HttpMethod::PATCH,
                HttpMethod::DELETE,
                HttpMethod::OPTIONS,
            ]
        );
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = RouterConfig::default();
        config.allowed_methods = vec![];
        assert!(config.validate().is_err());

        let mut config = RouterConfig::default();
        config.allowed_methods = vec!["FETCH".to_string()];
        assert_eq!(config.validate().unwrap_err().field(), Some("allowed_methods"));

        let mut config = RouterConfig::default();
        config.route_query_var = "route-var".to_string();
        assert!(config.validate().is_err());

        let mut config = RouterConfig::default();
        config.param_capture = "[^/]+".to_string();
        assert!(config.validate().is_err());

        let mut config = RouterConfig::default();
        config.global_namespace = "/".to_string();
        assert!(config.validate().is_err());

        let config = RouterConfig::default().with_home_url("localhost");
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = RouterConfig::from_env().unwrap();
        assert_eq!(config.allowed_methods.len(), 6);
        assert_eq!(config.default_position, Position::Top);
        assert!(config.config_sources()["allowed_methods"].is_default());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        clear_env();
        env::set_var(ALLOWED_METHODS_VAR, "get, post");
        env::set_var(ROUTE_QUERY_VAR_VAR, "app_route");
        env::set_var(DEFAULT_POSITION_VAR, "bottom");

        let config = RouterConfig::from_env().unwrap();
        assert_eq!(config.allowed(), vec![HttpMethod::GET, HttpMethod::POST]);
        assert_eq!(config.route_query_var, "app_route");
        assert_eq!(config.default_position, Position::Bottom);
        assert!(config.config_sources()["route_query_var"].is_env_var());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_unknown_position() {
        clear_env();
        env::set_var(DEFAULT_POSITION_VAR, "middle");
        let err = RouterConfig::from_env().unwrap_err();
        assert_eq!(err.field(), Some("default_position"));
        clear_env();
    }
}
