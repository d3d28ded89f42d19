//! Request fixtures

use serde_json::Value;
use switchyard_router::{RouteRequest, RouterDefaults};

/// Fluent builder for [`RouteRequest`]s as a host would hand them over
#[derive(Debug, Clone)]
pub struct TestRequest {
    request: RouteRequest,
}

impl TestRequest {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            request: RouteRequest::new(method, path),
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new("GET", path)
    }

    pub fn post(path: &str) -> Self {
        Self::new("POST", path)
    }

    pub fn put(path: &str) -> Self {
        Self::new("PUT", path)
    }

    pub fn delete(path: &str) -> Self {
        Self::new("DELETE", path)
    }

    /// Request the host's rewrite layer matched to the route declared at
    /// `route_path`, using the default route query variable
    pub fn rewrite(method: &str, route_path: &str) -> Self {
        Self::new(method, route_path).var(RouterDefaults::ROUTE_QUERY_VAR, route_path)
    }

    /// Rewrite query variable as parsed by the host
    pub fn var(mut self, name: &str, value: &str) -> Self {
        self.request = self.request.with_route_var(name, value);
        self
    }

    pub fn query(mut self, name: &str, value: &str) -> Self {
        self.request = self.request.with_query(name, value);
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.request = self.request.with_header(name, value);
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.request = self.request.with_body(body);
        self
    }

    pub fn namespace(mut self, namespace: &str) -> Self {
        self.request = self.request.with_namespace(namespace);
        self
    }

    /// Pre-extracted route parameter, as the host's REST layer supplies it
    pub fn param(mut self, name: &str, value: &str) -> Self {
        self.request.params.push(name, value);
        self
    }

    pub fn build(self) -> RouteRequest {
        self.request
    }
}

impl From<TestRequest> for RouteRequest {
    fn from(request: TestRequest) -> Self {
        request.build()
    }
}
