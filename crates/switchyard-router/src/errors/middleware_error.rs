use crate::response::RouteResponse;
use thiserror::Error;

/// Result produced by a middleware unit or a route handler
pub type MiddlewareResult = Result<RouteResponse, MiddlewareError>;

/// Failure raised while a request travels through a middleware chain.
///
/// `kind` is a dotted label such as `"auth.denied"` that hosts can match on;
/// handlers fail with the same type since the handler is the chain terminal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct MiddlewareError {
    pub kind: String,
    pub message: String,
}

impl MiddlewareError {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Error with the generic `"middleware"` kind
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new("middleware", message)
    }

    /// Error raised by a route handler
    pub fn handler(message: impl Into<String>) -> Self {
        Self::new("handler", message)
    }

    pub fn error_code(&self) -> &'static str {
        "MIDDLEWARE_FAILURE"
    }
}

impl From<String> for MiddlewareError {
    fn from(message: String) -> Self {
        MiddlewareError::msg(message)
    }
}

impl From<&str> for MiddlewareError {
    fn from(message: &str) -> Self {
        MiddlewareError::msg(message)
    }
}
