//! Probing middleware and handlers
//!
//! Counters are shared `Arc<AtomicUsize>` values so a test keeps a handle
//! after the unit has been moved into a route's chain.

use http::StatusCode;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use switchyard_router::handlers::RouteHandler;
use switchyard_router::middleware::{Middleware, Next, NextFuture};
use switchyard_router::{MiddlewareError, RouteRequest, RouteResponse};

/// Passes through and counts how often it ran
#[derive(Debug, Clone)]
pub struct CountingMiddleware {
    name: String,
    runs: Arc<AtomicUsize>,
}

impl CountingMiddleware {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            runs: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn count(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn unit(&self) -> Arc<dyn Middleware> {
        Arc::new(self.clone())
    }
}

impl Middleware for CountingMiddleware {
    fn handle(&self, request: RouteRequest, next: Next) -> NextFuture {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Box::pin(next.run(request))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Answers with `status` and never calls `next`
#[derive(Debug, Clone)]
pub struct ShortCircuitMiddleware {
    name: String,
    status: StatusCode,
    runs: Arc<AtomicUsize>,
}

impl ShortCircuitMiddleware {
    pub fn new(name: impl Into<String>, status: StatusCode) -> Self {
        Self {
            name: name.into(),
            status,
            runs: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// 401 responder, the usual auth check stand-in
    pub fn unauthorized(name: impl Into<String>) -> Self {
        Self::new(name, StatusCode::UNAUTHORIZED)
    }

    pub fn count(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn unit(&self) -> Arc<dyn Middleware> {
        Arc::new(self.clone())
    }
}

impl Middleware for ShortCircuitMiddleware {
    fn handle(&self, _request: RouteRequest, _next: Next) -> NextFuture {
        self.runs.fetch_add(1, Ordering::SeqCst);
        let response = RouteResponse::text(
            self.status.canonical_reason().unwrap_or_default(),
            self.status,
        );
        Box::pin(async move { Ok(response) })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Fails with a fixed error kind
#[derive(Debug, Clone)]
pub struct FailingMiddleware {
    kind: String,
    message: String,
}

impl FailingMiddleware {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn unit(&self) -> Arc<dyn Middleware> {
        Arc::new(self.clone())
    }
}

impl Middleware for FailingMiddleware {
    fn handle(&self, _request: RouteRequest, _next: Next) -> NextFuture {
        let error = MiddlewareError::new(self.kind.clone(), self.message.clone());
        Box::pin(async move { Err(error) })
    }

    fn name(&self) -> &str {
        &self.kind
    }
}

/// Shared log of `label:before` / `label:after` entries.
///
/// Units and handlers created from one recorder write to the same log, so the
/// log shows the exact nesting of a chain run.
#[derive(Debug, Clone, Default)]
pub struct OrderRecorder {
    log: Arc<Mutex<Vec<String>>>,
}

impl OrderRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unit(&self, label: impl Into<String>) -> Arc<dyn Middleware> {
        Arc::new(ProbeUnit {
            label: label.into(),
            log: Arc::clone(&self.log),
        })
    }

    /// Handler that records `label` and answers 200
    pub fn handler(&self, label: impl Into<String>) -> impl RouteHandler + 'static {
        let label = label.into();
        let log = Arc::clone(&self.log);
        move |_request: RouteRequest| {
            log.lock().push(label.clone());
            async { Ok::<_, MiddlewareError>(RouteResponse::ok()) }
        }
    }

    pub fn entries(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    pub fn clear(&self) {
        self.log.lock().clear();
    }
}

#[derive(Debug)]
struct ProbeUnit {
    label: String,
    log: Arc<Mutex<Vec<String>>>,
}

impl Middleware for ProbeUnit {
    fn handle(&self, request: RouteRequest, next: Next) -> NextFuture {
        let label = self.label.clone();
        let log = Arc::clone(&self.log);
        Box::pin(async move {
            log.lock().push(format!("{}:before", label));
            let response = next.run(request).await;
            log.lock().push(format!("{}:after", label));
            response
        })
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// Handler that counts its calls and echoes the route parameters as JSON
#[derive(Debug, Clone, Default)]
pub struct CountingHandler {
    calls: Arc<AtomicUsize>,
    last_params: Arc<Mutex<Vec<(String, String)>>>,
}

impl CountingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Parameters of the most recent call, in template order
    pub fn last_params(&self) -> Vec<(String, String)> {
        self.last_params.lock().clone()
    }
}

impl RouteHandler for CountingHandler {
    fn call(&self, request: RouteRequest) -> NextFuture {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let params: Vec<(String, String)> = request
            .params
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        *self.last_params.lock() = params;

        let body = json!(request.params.to_map());
        Box::pin(async move { Ok(RouteResponse::json(body)) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchyard_router::MiddlewareChain;

    #[tokio::test]
    async fn test_recorder_records_nesting() {
        let recorder = OrderRecorder::new();
        let chain = MiddlewareChain::new()
            .with(recorder.unit("outer"))
            .with(recorder.unit("inner"));
        let handler = recorder.handler("handler");

        chain
            .run(RouteRequest::new("GET", "x"), move |req| handler.call(req))
            .await
            .unwrap();

        assert_eq!(
            recorder.entries(),
            vec!["outer:before", "inner:before", "handler", "inner:after", "outer:after"]
        );
    }

    #[tokio::test]
    async fn test_short_circuit_stops_chain() {
        let auth = ShortCircuitMiddleware::unauthorized("auth");
        let logger = CountingMiddleware::new("logger");
        let handler = CountingHandler::new();
        let terminal = handler.clone();

        let response = MiddlewareChain::new()
            .with(auth.unit())
            .with(logger.unit())
            .run(RouteRequest::new("GET", "x"), move |req| terminal.call(req))
            .await
            .unwrap();

        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(auth.count(), 1);
        assert_eq!(logger.count(), 0);
        assert_eq!(handler.count(), 0);
    }
}
