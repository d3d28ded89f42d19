//! Ordered middleware chains

use super::{Middleware, Next, NextFuture};
use crate::errors::MiddlewareResult;
use crate::request::RouteRequest;
use std::future::Future;
use std::sync::Arc;

/// Ordered list of middleware units wrapped around a terminal handler.
///
/// Units run outermost first: the first unit appended sees the request
/// first and the response last.
#[derive(Debug, Clone, Default)]
pub struct MiddlewareChain {
    middleware: Vec<Arc<dyn Middleware>>,
}

impl MiddlewareChain {
    /// Create a new empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a unit at the innermost position
    pub fn append(&mut self, middleware: Arc<dyn Middleware>) {
        self.middleware.push(middleware);
    }

    /// Append units in order
    pub fn append_many<I>(&mut self, middleware: I)
    where
        I: IntoIterator<Item = Arc<dyn Middleware>>,
    {
        self.middleware.extend(middleware);
    }

    /// Builder form of [`append`](Self::append)
    pub fn with(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.append(middleware);
        self
    }

    /// Chain whose units are `parent`'s followed by this chain's own
    pub fn inherit(&self, parent: &MiddlewareChain) -> MiddlewareChain {
        let mut middleware = parent.middleware.clone();
        middleware.extend(self.middleware.iter().cloned());
        MiddlewareChain { middleware }
    }

    pub fn units(&self) -> &[Arc<dyn Middleware>] {
        &self.middleware
    }

    /// Get number of units in the chain
    pub fn len(&self) -> usize {
        self.middleware.len()
    }

    /// Check if chain is empty
    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// Get unit names for debugging
    pub fn names(&self) -> Vec<String> {
        self.middleware.iter().map(|m| m.name().to_string()).collect()
    }

    /// Run the request through every unit and then `terminal`.
    ///
    /// A unit that returns without calling `next` ends the run; the units
    /// after it and the terminal are never invoked. Each `next` is built
    /// only when the unit before it runs.
    pub async fn run<F, Fut>(&self, request: RouteRequest, terminal: F) -> MiddlewareResult
    where
        F: FnOnce(RouteRequest) -> Fut + Send + 'static,
        Fut: Future<Output = MiddlewareResult> + Send + 'static,
    {
        let units: Arc<[Arc<dyn Middleware>]> = self.middleware.clone().into();
        let terminal: Continuation = Box::new(move |req| Box::pin(terminal(req)) as NextFuture);
        step(units, 0, terminal)(request).await
    }
}

type Continuation = Box<dyn FnOnce(RouteRequest) -> NextFuture + Send>;

/// Continuation running the unit at `index`, or `terminal` past the end
fn step(units: Arc<[Arc<dyn Middleware>]>, index: usize, terminal: Continuation) -> Continuation {
    Box::new(move |req: RouteRequest| match units.get(index).cloned() {
        Some(middleware) => {
            let next = Next::new(step(units, index + 1, terminal));
            middleware.handle(req, next)
        }
        None => terminal(req),
    })
}

impl From<Vec<Arc<dyn Middleware>>> for MiddlewareChain {
    fn from(middleware: Vec<Arc<dyn Middleware>>) -> Self {
        Self { middleware }
    }
}
