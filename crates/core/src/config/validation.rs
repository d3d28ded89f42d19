use thiserror::Error;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required field: {field}. {hint}")]
    MissingRequired { field: String, hint: String },

    #[error("Invalid value for field '{field}': '{value}'. Expected: {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Configuration validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Environment variable error: {message}")]
    EnvironmentError { message: String },
}

impl ConfigError {
    /// Create a missing required field error
    pub fn missing_required(field: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::MissingRequired {
            field: field.into(),
            hint: hint.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Create a validation failed error
    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    /// Create an environment error
    pub fn environment_error(message: impl Into<String>) -> Self {
        Self::EnvironmentError {
            message: message.into(),
        }
    }

    /// Name of the offending field, when the error is tied to one
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::MissingRequired { field, .. } | ConfigError::InvalidValue { field, .. } => {
                Some(field)
            }
            _ => None,
        }
    }
}

/// Trait for validating configuration values
pub trait ConfigValidator<T: ?Sized> {
    /// Validate `value`, reporting failures against `field`
    fn validate(&self, field: &str, value: &T) -> Result<(), ConfigError>;
}

/// Absolute URL validator backed by the `url` parser
pub struct UrlValidator {
    pub schemes: Vec<String>,
}

impl Default for UrlValidator {
    fn default() -> Self {
        Self {
            schemes: vec!["http".to_string(), "https".to_string()],
        }
    }
}

impl ConfigValidator<str> for UrlValidator {
    fn validate(&self, field: &str, value: &str) -> Result<(), ConfigError> {
        let parsed = url::Url::parse(value).map_err(|e| {
            ConfigError::invalid_value(field, value, format!("absolute URL ({})", e))
        })?;

        if !self.schemes.iter().any(|scheme| scheme == parsed.scheme()) {
            return Err(ConfigError::invalid_value(
                field,
                value,
                format!("URL with scheme: {}", self.schemes.join(", ")),
            ));
        }

        if parsed.host_str().is_none() {
            return Err(ConfigError::invalid_value(field, value, "URL with host"));
        }

        Ok(())
    }
}

/// Accepts non-empty `[A-Za-z0-9_]` identifiers
pub struct IdentifierValidator;

impl ConfigValidator<str> for IdentifierValidator {
    fn validate(&self, field: &str, value: &str) -> Result<(), ConfigError> {
        if value.is_empty() || !value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(ConfigError::invalid_value(
                field,
                value,
                "non-empty identifier of letters, digits and underscores",
            ));
        }
        Ok(())
    }
}

/// Accepts regular expressions with an exact number of capture groups
pub struct CaptureRegexValidator {
    pub capture_groups: usize,
}

impl Default for CaptureRegexValidator {
    fn default() -> Self {
        Self { capture_groups: 1 }
    }
}

impl ConfigValidator<str> for CaptureRegexValidator {
    fn validate(&self, field: &str, value: &str) -> Result<(), ConfigError> {
        let regex = regex::Regex::new(value).map_err(|e| {
            ConfigError::invalid_value(field, value, format!("valid regular expression ({})", e))
        })?;

        // captures_len counts the implicit whole-match group
        let groups = regex.captures_len() - 1;
        if groups != self.capture_groups {
            return Err(ConfigError::invalid_value(
                field,
                value,
                format!("expression with exactly {} capture group(s)", self.capture_groups),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_validator() {
        let validator = UrlValidator::default();

        assert!(validator.validate("home_url", "https://example.com").is_ok());
        assert!(validator.validate("home_url", "http://localhost:3000/wp").is_ok());
        assert!(validator.validate("home_url", "ftp://example.com").is_err());

        let err = validator.validate("home_url", "not-a-url").unwrap_err();
        assert_eq!(err.field(), Some("home_url"));
    }

    #[test]
    fn test_identifier_validator() {
        assert!(IdentifierValidator.validate("var", "mtwp_route").is_ok());
        assert!(IdentifierValidator.validate("var", "").is_err());
        assert!(IdentifierValidator.validate("var", "route-var").is_err());
    }

    #[test]
    fn test_capture_regex_validator() {
        let validator = CaptureRegexValidator::default();

        assert!(validator.validate("capture", "([^/]+)").is_ok());
        assert!(validator.validate("capture", "[^/]+").is_err());
        assert!(validator.validate("capture", "(a)(b)").is_err());
        assert!(validator.validate("capture", "([").is_err());
    }
}
