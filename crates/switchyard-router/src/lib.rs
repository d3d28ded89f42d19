//! # switchyard-router
//!
//! Declarative route registry and dispatch engine for host applications.
//!
//! This crate provides:
//! - Path templates with `{name}` parameters, compiled to anchored rules
//! - Nested route groups contributing prefixes, middleware and REST metadata
//! - Named, argument-carrying middleware resolved into ordered chains
//! - Rewrite-rule registration with fingerprint-gated flushing
//! - REST endpoint publishing with namespaces and permission checks
//! - Dispatch against immutable, atomically swapped route tables

// Core modules
pub mod bootstrap;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod handlers;
pub mod host;
pub mod logging;
pub mod middleware;
pub mod request;
pub mod response;
pub mod routing;

pub use config::{RouterConfig, RouterDefaults};
pub use errors::{MiddlewareError, MiddlewareResult, PatternError, RoutingError, RoutingResult};

// Re-export routing types
pub use routing::{
    CompiledRoute, Flavor, GroupBuilder, GroupId, HttpMethod, ParamError, PathPattern, Position,
    Resolution, Route, RouteGroup, RouteHandle, RouteParams, RouteRef, RouteRegistry, RouteTable,
};

// Re-export middleware types
pub use middleware::{
    middleware_fn, Middleware, MiddlewareChain, MiddlewareEntry, MiddlewareRegistry, Next,
    NextFuture,
};

pub use dispatch::{DispatchOutcome, DispatchState, Dispatcher};
pub use handlers::{Handler, RouteHandler};
pub use host::{Endpoint, EndpointPublisher, HostFacilities, PermissionCheck, RewriteFacility, RewriteRule};
pub use request::RouteRequest;
pub use response::{
    RenderedResponse, Responder, ResponseBody, RouteResponse, TemplateRenderer, ViewRenderer,
};

pub use bootstrap::{DefinitionLoader, RegistrationReport, RouteDefinitions, RouteService, RouteSet};
pub use logging::{init_logging, LoggingConfig};

/// Commonly used types for declaring routes and middleware
pub mod prelude {
    pub use crate::bootstrap::{RouteDefinitions, RouteService, RouteSet};
    pub use crate::errors::{MiddlewareError, MiddlewareResult};
    pub use crate::handlers::Handler;
    pub use crate::middleware::{middleware_fn, Middleware, MiddlewareRegistry, Next, NextFuture};
    pub use crate::request::RouteRequest;
    pub use crate::response::RouteResponse;
    pub use crate::routing::{Flavor, HttpMethod, Position, RouteRegistry};
}
