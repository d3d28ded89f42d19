//! # Middleware
//!
//! Route middleware follows the `handle(request, next)` pattern: a unit may
//! inspect or alter the request, call `next.run(request)` to continue, and
//! inspect or alter the response on the way back. Returning without calling
//! `next` short-circuits the rest of the chain, handler included.

pub mod chain;
pub mod resolver;

pub use chain::MiddlewareChain;
pub use resolver::{parse_token, MiddlewareEntry, MiddlewareFactory, MiddlewareRegistry};

use crate::errors::MiddlewareResult;
use crate::request::RouteRequest;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Type alias for boxed future in Next
pub type NextFuture = Pin<Box<dyn Future<Output = MiddlewareResult> + Send + 'static>>;

/// Next represents the rest of the middleware chain
pub struct Next {
    handler: Box<dyn FnOnce(RouteRequest) -> NextFuture + Send>,
}

impl Next {
    /// Create a new Next with a handler function
    pub fn new<F>(handler: F) -> Self
    where
        F: FnOnce(RouteRequest) -> NextFuture + Send + 'static,
    {
        Self {
            handler: Box::new(handler),
        }
    }

    /// Run the rest of the middleware chain with the given request
    pub async fn run(self, request: RouteRequest) -> MiddlewareResult {
        (self.handler)(request).await
    }
}

impl std::fmt::Debug for Next {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}

/// Route middleware unit.
///
/// Uses boxed futures to stay dyn-compatible.
pub trait Middleware: Send + Sync + std::fmt::Debug {
    /// Handle the request and call the next unit in the chain
    fn handle(&self, request: RouteRequest, next: Next) -> NextFuture;

    /// Name used in logs and chain introspection
    fn name(&self) -> &str {
        "Middleware"
    }
}

/// Middleware built from a closure
pub struct FnMiddleware<F> {
    name: String,
    f: F,
}

impl<F, Fut> Middleware for FnMiddleware<F>
where
    F: Fn(RouteRequest, Next) -> Fut + Send + Sync,
    Fut: Future<Output = MiddlewareResult> + Send + 'static,
{
    fn handle(&self, request: RouteRequest, next: Next) -> NextFuture {
        Box::pin((self.f)(request, next))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> std::fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnMiddleware").field("name", &self.name).finish()
    }
}

/// Wrap a closure as a shareable middleware unit
pub fn middleware_fn<F, Fut>(name: impl Into<String>, f: F) -> Arc<dyn Middleware>
where
    F: Fn(RouteRequest, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = MiddlewareResult> + Send + 'static,
{
    Arc::new(FnMiddleware {
        name: name.into(),
        f,
    })
}
