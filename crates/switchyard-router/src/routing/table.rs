//! Compiled route tables
//!
//! A [`RouteTable`] is the immutable snapshot dispatchers read. Every route
//! in it has its full path compiled, its handler resolved, its middleware
//! chain built and its REST metadata settled, so resolution never touches
//! the declaration-time registry.

use super::params::RouteParams;
use super::pattern::PathPattern;
use super::{trim_path, Flavor, HttpMethod, Position};
use crate::config::RouterConfig;
use crate::handlers::RouteHandler;
use crate::host::{Endpoint, PermissionCheck, RewriteRule};
use crate::middleware::MiddlewareChain;
use crate::request::RouteRequest;
use serde_json::{Map, Value};
use std::sync::Arc;

/// A route ready for dispatch
pub struct CompiledRoute {
    pub(crate) name: Option<String>,
    pub(crate) path: String,
    pub(crate) pattern: PathPattern,
    pub(crate) methods: Vec<HttpMethod>,
    pub(crate) handler: Arc<dyn RouteHandler>,
    pub(crate) middleware: MiddlewareChain,
    pub(crate) position: Position,
    pub(crate) namespace: String,
    pub(crate) exposed: bool,
    pub(crate) permission: PermissionCheck,
    pub(crate) base_url: String,
}

impl CompiledRoute {
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Full path template including group prefixes
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn methods(&self) -> &[HttpMethod] {
        &self.methods
    }

    pub fn handler(&self) -> &Arc<dyn RouteHandler> {
        &self.handler
    }

    pub fn middleware(&self) -> &MiddlewareChain {
        &self.middleware
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn is_exposed(&self) -> bool {
        self.exposed
    }

    pub fn permission(&self) -> &PermissionCheck {
        &self.permission
    }

    /// Whether `method` may reach this route; an empty set allows any
    pub fn allows(&self, method: &str) -> bool {
        if self.methods.is_empty() {
            return true;
        }
        method
            .parse::<HttpMethod>()
            .map(|m| self.methods.contains(&m))
            .unwrap_or(false)
    }

    /// Endpoint callback key: the name, else the full path
    pub fn handle(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.path,
        }
    }

    /// Absolute URL with `args` substituted
    pub fn url<I, K, V>(&self, args: I) -> String
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        format!("{}{}", self.base_url, self.pattern.build(args))
    }

    /// Host rewrite rule for this route.
    ///
    /// The target carries the url-encoded full path in `query_var` and one
    /// `name=$matches[i]` pair per parameter.
    pub fn rewrite_rule(&self, query_var: &str, script: &str) -> RewriteRule {
        let encoded: String = url::form_urlencoded::byte_serialize(self.path.as_bytes()).collect();
        let mut target = format!("{}?{}={}", script, query_var, encoded);
        for (index, param) in self.pattern.param_names().iter().enumerate() {
            target.push_str(&format!("&{}=$matches[{}]", param, index + 1));
        }

        RewriteRule {
            regex: self.pattern.regex_source().to_string(),
            target,
            position: self.position,
        }
    }

    /// Endpoint description handed to the host's REST layer
    pub fn endpoint(&self) -> Endpoint {
        Endpoint {
            namespace: self.namespace.clone(),
            path: self.path.clone(),
            pattern: self.pattern.regex_source().to_string(),
            methods: self.methods.clone(),
            permission: self.permission.clone(),
            handle: self.handle().to_string(),
        }
    }

    /// True when the rewrite query variable names this route
    fn is_named_by(&self, route_var: &str) -> bool {
        let route_var = trim_path(route_var);
        if route_var == self.path {
            return true;
        }
        let encoded: String = url::form_urlencoded::byte_serialize(self.path.as_bytes()).collect();
        route_var == encoded
    }
}

impl std::fmt::Debug for CompiledRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledRoute")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("methods", &self.methods)
            .field("middleware", &self.middleware.names())
            .field("position", &self.position)
            .field("namespace", &self.namespace)
            .finish()
    }
}

/// Result of looking a request up in a table
#[derive(Debug, Clone)]
pub enum Resolution {
    Matched {
        route: Arc<CompiledRoute>,
        params: RouteParams,
    },
    NotFound,
    /// Some route's path matched but none allowed the method
    MethodNotAllowed { allowed: Vec<HttpMethod> },
}

/// Immutable compiled snapshot of one registry
#[derive(Debug)]
pub struct RouteTable {
    flavor: Flavor,
    config: Arc<RouterConfig>,
    routes: Vec<Arc<CompiledRoute>>,
    fingerprint: String,
}

impl RouteTable {
    pub(crate) fn new(
        flavor: Flavor,
        config: Arc<RouterConfig>,
        routes: Vec<Arc<CompiledRoute>>,
        fingerprint: String,
    ) -> Self {
        Self {
            flavor,
            config,
            routes,
            fingerprint,
        }
    }

    /// Table with no routes; every lookup is a miss
    pub fn empty(flavor: Flavor, config: Arc<RouterConfig>) -> Self {
        let fingerprint = super::fingerprint::fingerprint(&[]);
        Self::new(flavor, config, Vec::new(), fingerprint)
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Routes in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<CompiledRoute>> {
        self.routes.iter()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Arc<CompiledRoute>> {
        self.routes.iter().find(|route| route.name() == Some(name))
    }

    pub fn find_by_handle(&self, handle: &str) -> Option<&Arc<CompiledRoute>> {
        self.routes.iter().find(|route| route.handle() == handle)
    }

    /// Look up a rewrite route by the value of the host's route query variable.
    ///
    /// Parameter values are read from the request's route variables.
    pub fn resolve_route_var(&self, route_var: &str, request: &RouteRequest) -> Resolution {
        let mut allowed = Vec::new();
        for route in self.routes.iter().filter(|route| route.is_named_by(route_var)) {
            if route.allows(&request.method) {
                let params = route
                    .pattern
                    .param_names()
                    .iter()
                    .filter_map(|name| {
                        request
                            .route_var(name)
                            .map(|value| (name.clone(), value.to_string()))
                    })
                    .collect();
                return Resolution::Matched {
                    route: Arc::clone(route),
                    params,
                };
            }
            allowed.extend(route.methods.iter().copied());
        }
        Self::miss(allowed)
    }

    /// Match a request path against every route, first match wins.
    ///
    /// REST routes also accept paths carrying their namespace, and skip
    /// routes outside `namespace` when one is given.
    pub fn resolve_path(&self, path: &str, method: &str, namespace: Option<&str>) -> Resolution {
        let path = trim_path(path);
        let namespace = namespace.map(trim_path);
        let mut allowed = Vec::new();

        for route in &self.routes {
            let candidate = match (self.flavor, namespace) {
                (Flavor::Rest, Some(ns)) if ns != route.namespace => continue,
                (Flavor::Rest, _) => strip_namespace(path, &route.namespace),
                _ => path,
            };

            let Some(params) = route.pattern.matches(candidate) else {
                continue;
            };
            if route.allows(method) {
                return Resolution::Matched {
                    route: Arc::clone(route),
                    params,
                };
            }
            allowed.extend(route.methods.iter().copied());
        }
        Self::miss(allowed)
    }

    fn miss(mut allowed: Vec<HttpMethod>) -> Resolution {
        if allowed.is_empty() {
            return Resolution::NotFound;
        }
        allowed.sort();
        allowed.dedup();
        Resolution::MethodNotAllowed { allowed }
    }

    /// `{ name: url }` for exposed, named routes
    pub fn exposed_routes(&self) -> Value {
        let mut object = Map::new();
        for route in self.routes.iter().filter(|route| route.exposed) {
            if let Some(name) = route.name() {
                let url = route.url(Vec::<(&str, &str)>::new());
                object.insert(name.to_string(), Value::String(url));
            }
        }
        Value::Object(object)
    }

    /// `<script>` assigning the exposed routes to the configured variable
    pub fn expose_script(&self) -> String {
        format!(
            "<script>var {} = {};</script>",
            self.config.expose_var,
            self.exposed_routes()
        )
    }
}

fn strip_namespace<'p>(path: &'p str, namespace: &str) -> &'p str {
    if namespace.is_empty() {
        return path;
    }
    match path.strip_prefix(namespace) {
        Some("") => "",
        Some(rest) => rest.strip_prefix('/').unwrap_or(path),
        None => path,
    }
}
