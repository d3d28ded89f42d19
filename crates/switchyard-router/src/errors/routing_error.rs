use switchyard_core::ConfigError;
use thiserror::Error;

/// Result type for declaration and registration operations
pub type RoutingResult<T> = Result<T, RoutingError>;

/// Errors raised while compiling a path template
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("Duplicate parameter name: {0}")]
    DuplicateParameter(String),

    #[error("Invalid parameter token: {{{0}}}")]
    InvalidParameter(String),

    #[error("Invalid pattern expression: {0}")]
    Regex(String),
}

impl PatternError {
    pub fn error_code(&self) -> &'static str {
        match self {
            PatternError::DuplicateParameter(_) => "DUPLICATE_PARAMETER",
            PatternError::InvalidParameter(_) => "INVALID_PARAMETER",
            PatternError::Regex(_) => "INVALID_PATTERN_EXPRESSION",
        }
    }
}

/// Route declaration and registration errors
#[derive(Error, Debug, Clone)]
pub enum RoutingError {
    #[error("Invalid route pattern '{path}': {source}")]
    InvalidPattern {
        path: String,
        #[source]
        source: PatternError,
    },

    #[error("No allowed methods in {requested:?}")]
    NoAllowedMethods { requested: Vec<String> },

    #[error("Middleware '{name}' is not registered")]
    UnresolvedMiddleware { name: String },

    #[error("Host collaborator missing: {collaborator}")]
    MissingCollaborator { collaborator: String },

    #[error("Route group stack is empty")]
    GroupStackEmpty,

    #[error("Rendering failed: {message}")]
    Render { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl RoutingError {
    /// Create an invalid pattern error
    pub fn invalid_pattern<T: Into<String>>(path: T, source: PatternError) -> Self {
        RoutingError::InvalidPattern {
            path: path.into(),
            source,
        }
    }

    /// Create a no-allowed-methods error from the raw request list
    pub fn no_allowed_methods<I, S>(requested: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        RoutingError::NoAllowedMethods {
            requested: requested
                .into_iter()
                .map(|m| m.as_ref().to_string())
                .collect(),
        }
    }

    /// Create an unresolved middleware error
    pub fn unresolved_middleware<T: Into<String>>(name: T) -> Self {
        RoutingError::UnresolvedMiddleware { name: name.into() }
    }

    /// Create a missing collaborator error
    pub fn missing_collaborator<T: Into<String>>(collaborator: T) -> Self {
        RoutingError::MissingCollaborator {
            collaborator: collaborator.into(),
        }
    }

    /// Create a render error
    pub fn render<T: Into<String>>(message: T) -> Self {
        RoutingError::Render {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config<T: Into<String>>(message: T) -> Self {
        RoutingError::Config {
            message: message.into(),
        }
    }

    /// Get error code for consistent reporting
    pub fn error_code(&self) -> &'static str {
        match self {
            RoutingError::InvalidPattern { .. } => "INVALID_ROUTE_PATTERN",
            RoutingError::NoAllowedMethods { .. } => "NO_ALLOWED_METHODS",
            RoutingError::UnresolvedMiddleware { .. } => "UNRESOLVED_MIDDLEWARE",
            RoutingError::MissingCollaborator { .. } => "MISSING_COLLABORATOR",
            RoutingError::GroupStackEmpty => "GROUP_STACK_EMPTY",
            RoutingError::Render { .. } => "RENDER_FAILED",
            RoutingError::Config { .. } => "CONFIGURATION_ERROR",
        }
    }
}

impl From<ConfigError> for RoutingError {
    fn from(err: ConfigError) -> Self {
        RoutingError::config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            RoutingError::no_allowed_methods(["foo"]).error_code(),
            "NO_ALLOWED_METHODS"
        );
        assert_eq!(RoutingError::GroupStackEmpty.error_code(), "GROUP_STACK_EMPTY");
        assert_eq!(
            PatternError::DuplicateParameter("id".into()).error_code(),
            "DUPLICATE_PARAMETER"
        );
    }

    #[test]
    fn test_invalid_pattern_display_includes_source() {
        let err = RoutingError::invalid_pattern(
            "users/{id}/{id}",
            PatternError::DuplicateParameter("id".into()),
        );
        let text = err.to_string();
        assert!(text.contains("users/{id}/{id}"));
        assert!(text.contains("Duplicate parameter name: id"));
    }

    #[test]
    fn test_config_error_conversion() {
        let err: RoutingError = ConfigError::validation_failed("bad").into();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }
}
