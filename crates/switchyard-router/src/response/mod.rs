//! Route responses
//!
//! Handlers and middleware build a [`RouteResponse`]; the [`Responder`]
//! turns it into the status, headers and body string the host emits.

pub mod responder;

pub use responder::{RenderedResponse, Responder, TemplateRenderer, ViewRenderer};

use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};

/// Response body variants
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Empty,
    Text(String),
    Json(Value),
    /// Template rendered by the host's view library
    View { template: String, data: Value },
    /// One of the host's own templates, e.g. `"404"`
    HostTemplate(String),
}

/// Response produced by a handler or a short-circuiting middleware
#[derive(Debug, Clone)]
pub struct RouteResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: ResponseBody,
}

impl Default for RouteResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteResponse {
    /// Create new response with OK status
    pub fn new() -> Self {
        Self::with_status(StatusCode::OK)
    }

    pub fn ok() -> Self {
        Self::new()
    }

    /// Create response with specific status code
    pub fn with_status(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: ResponseBody::Empty,
        }
    }

    /// Plain text or markup body
    pub fn text(content: impl Into<String>, status: StatusCode) -> Self {
        Self::with_status(status).with_text(content)
    }

    /// JSON body with OK status
    pub fn json(value: Value) -> Self {
        Self::new().with_json(value)
    }

    /// Serialize `data` into a JSON body.
    ///
    /// Serialization failures become a 500 response.
    pub fn serialized<T: Serialize>(data: &T) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => Self::json(value),
            Err(err) => {
                tracing::error!(target: "switchyard::response", error = %err, "JSON serialization failed");
                Self::error("SERIALIZATION_FAILED", err.to_string(), StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }

    /// Body rendered by the host's view library
    pub fn view(template: impl Into<String>, data: Value) -> Self {
        Self {
            body: ResponseBody::View {
                template: template.into(),
                data,
            },
            ..Self::new()
        }
    }

    /// One of the host's own templates at the given status
    pub fn host_template(template: impl Into<String>, status: StatusCode) -> Self {
        Self {
            body: ResponseBody::HostTemplate(template.into()),
            ..Self::with_status(status)
        }
    }

    /// 404 with a plain message
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::text(message, StatusCode::NOT_FOUND)
    }

    /// JSON error body `{ "error": { "code": …, "message": … } }`
    pub fn error(code: impl Into<String>, message: impl Into<String>, status: StatusCode) -> Self {
        Self::with_status(status).with_json(json!({
            "error": {
                "code": code.into(),
                "message": message.into(),
            }
        }))
    }

    pub fn with_text(mut self, content: impl Into<String>) -> Self {
        self.body = ResponseBody::Text(content.into());
        self
    }

    pub fn with_json(mut self, value: Value) -> Self {
        self.body = ResponseBody::Json(value);
        self
    }

    /// Set response status code (consuming)
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Set response status code (borrowing, for middleware use)
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Add a header.
    ///
    /// Invalid names or values are logged and the header is skipped.
    pub fn with_header<K, V>(mut self, key: K, value: V) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.insert_header(key, value);
        self
    }

    pub fn insert_header<K, V>(&mut self, key: K, value: V)
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let name = HeaderName::from_bytes(key.as_ref().as_bytes());
        let value = HeaderValue::from_str(value.as_ref());
        match (name, value) {
            (Ok(name), Ok(value)) => {
                self.headers.insert(name, value);
            }
            _ => {
                tracing::error!(
                    target: "switchyard::response",
                    header = key.as_ref(),
                    "Invalid response header skipped"
                );
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    pub fn into_parts(self) -> (StatusCode, HeaderMap, ResponseBody) {
        (self.status, self.headers, self.body)
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
