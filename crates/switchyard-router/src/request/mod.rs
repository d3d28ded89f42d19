//! Request context handed through middleware to route handlers

use crate::routing::{HttpMethod, RouteParams};
use serde_json::Value;
use std::collections::HashMap;

/// Host request as seen by the router.
///
/// `route_vars` holds the host's parsed rewrite query variables;
/// `params` is filled from the matched route before the chain runs.
#[derive(Debug, Clone, Default)]
pub struct RouteRequest {
    pub method: String,
    pub path: String,
    pub query_params: HashMap<String, String>,
    pub route_vars: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub body: Option<Value>,
    pub params: RouteParams,
    pub namespace: Option<String>,
    pub attributes: HashMap<String, Value>,
}

impl RouteRequest {
    pub fn new(method: impl AsRef<str>, path: impl Into<String>) -> Self {
        Self {
            method: method.as_ref().to_uppercase(),
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    pub fn with_route_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.route_vars.insert(name.into(), value.into());
        self
    }

    /// Header names are stored lowercased
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Parsed method, `None` for names the router does not know
    pub fn http_method(&self) -> Option<HttpMethod> {
        self.method.parse().ok()
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    pub fn route_var(&self, name: &str) -> Option<&str> {
        self.route_vars.get(name).map(String::as_str)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Attach data for later chain units or the handler
    pub fn set_attribute(&mut self, name: impl Into<String>, value: Value) {
        self.attributes.insert(name.into(), value);
    }
}
