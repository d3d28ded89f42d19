//! Route declaration and resolution
//!
//! This module provides:
//! - Path templates with `{name}` parameters ([`PathPattern`])
//! - Ordered parameter values ([`RouteParams`])
//! - Nested route groups with prefix, middleware and REST metadata inheritance
//! - The mutable per-flavor [`RouteRegistry`] used during declaration
//! - The immutable compiled [`RouteTable`] snapshot read by dispatchers
//! - Route set fingerprints for change detection

pub mod fingerprint;
pub mod group;
pub mod params;
pub mod pattern;
pub mod registry;
pub mod route;
pub mod table;

pub use fingerprint::{fingerprint, FingerprintEntry};
pub use group::{GroupBuilder, GroupId, RouteGroup};
pub use params::{ParamError, RouteParams};
pub use pattern::{PathPattern, PathSegment};
pub use registry::{Registration, RouteRegistry};
pub use route::{Route, RouteHandle, RouteRef};
pub use table::{CompiledRoute, Resolution, RouteTable};

use crate::errors::RoutingError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// HTTP methods understood by the router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
    OPTIONS,
    TRACE,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
            HttpMethod::TRACE => "TRACE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = RoutingError;

    /// Case-insensitive parse; `"get"` and `"GET"` are the same method.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::GET),
            "POST" => Ok(HttpMethod::POST),
            "PUT" => Ok(HttpMethod::PUT),
            "DELETE" => Ok(HttpMethod::DELETE),
            "PATCH" => Ok(HttpMethod::PATCH),
            "HEAD" => Ok(HttpMethod::HEAD),
            "OPTIONS" => Ok(HttpMethod::OPTIONS),
            "TRACE" => Ok(HttpMethod::TRACE),
            _ => Err(RoutingError::no_allowed_methods([s])),
        }
    }
}

impl TryFrom<&http::Method> for HttpMethod {
    type Error = RoutingError;

    fn try_from(method: &http::Method) -> Result<Self, Self::Error> {
        method.as_str().parse()
    }
}

impl From<HttpMethod> for http::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::GET => http::Method::GET,
            HttpMethod::POST => http::Method::POST,
            HttpMethod::PUT => http::Method::PUT,
            HttpMethod::DELETE => http::Method::DELETE,
            HttpMethod::PATCH => http::Method::PATCH,
            HttpMethod::HEAD => http::Method::HEAD,
            HttpMethod::OPTIONS => http::Method::OPTIONS,
            HttpMethod::TRACE => http::Method::TRACE,
        }
    }
}

/// How a registry's routes are exposed to and reached from the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    /// Routes become host rewrite rules; dispatch reads the host query var
    Rewrite,
    /// Routes become namespaced endpoints; dispatch matches the request path
    Rest,
}

impl std::fmt::Display for Flavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Flavor::Rewrite => f.write_str("rewrite"),
            Flavor::Rest => f.write_str("rest"),
        }
    }
}

/// Placement of a rewrite rule relative to the host's own rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    Top,
    Bottom,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Top => "top",
            Position::Bottom => "bottom",
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = RoutingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "top" => Ok(Position::Top),
            "bottom" => Ok(Position::Bottom),
            other => Err(RoutingError::config(format!(
                "unknown rule position '{}', expected top or bottom",
                other
            ))),
        }
    }
}

/// Strip leading and trailing slashes
pub fn trim_path(path: &str) -> &str {
    path.trim_matches('/')
}

/// Join path parts with `/`, dropping empty parts and stray slashes
pub fn join_path<'a, I>(parts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    parts
        .into_iter()
        .map(trim_path)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}
