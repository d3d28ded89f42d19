//! Route handlers
//!
//! A handler is the terminal of a route's middleware chain. Async closures
//! taking a [`RouteRequest`] implement [`RouteHandler`] directly; types that
//! should be constructed per registration are declared through
//! [`Handler::invokable`].

use crate::errors::MiddlewareResult;
use crate::middleware::NextFuture;
use crate::request::RouteRequest;
use std::future::Future;
use std::sync::Arc;

/// Terminal of a route's middleware chain
pub trait RouteHandler: Send + Sync {
    fn call(&self, request: RouteRequest) -> NextFuture;
}

impl<F, Fut> RouteHandler for F
where
    F: Fn(RouteRequest) -> Fut + Send + Sync,
    Fut: Future<Output = MiddlewareResult> + Send + 'static,
{
    fn call(&self, request: RouteRequest) -> NextFuture {
        Box::pin(self(request))
    }
}

/// Handler reference held by a declared route
#[derive(Clone)]
pub enum Handler {
    /// Ready-to-call handler
    Direct(Arc<dyn RouteHandler>),
    /// Handler type instantiated when the route table is compiled
    TypeRef {
        type_name: &'static str,
        construct: fn() -> Arc<dyn RouteHandler>,
    },
}

impl Handler {
    pub fn direct<H: RouteHandler + 'static>(handler: H) -> Self {
        Handler::Direct(Arc::new(handler))
    }

    /// Reference a handler type by its `Default` constructor
    pub fn invokable<T: RouteHandler + Default + 'static>() -> Self {
        fn construct<T: RouteHandler + Default + 'static>() -> Arc<dyn RouteHandler> {
            Arc::new(T::default())
        }
        Handler::TypeRef {
            type_name: std::any::type_name::<T>(),
            construct: construct::<T>,
        }
    }

    /// Callable form of this handler
    pub fn resolve(&self) -> Arc<dyn RouteHandler> {
        match self {
            Handler::Direct(handler) => Arc::clone(handler),
            Handler::TypeRef { construct, .. } => construct(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Handler::Direct(_) => "closure".to_string(),
            Handler::TypeRef { type_name, .. } => (*type_name).to_string(),
        }
    }
}

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Handler").field(&self.describe()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::RouteResponse;
    use http::StatusCode;

    #[derive(Default)]
    struct Greeter;

    impl RouteHandler for Greeter {
        fn call(&self, request: RouteRequest) -> NextFuture {
            let name = request.param("name").unwrap_or("world").to_string();
            Box::pin(async move { Ok(RouteResponse::text(format!("hello {}", name), StatusCode::OK)) })
        }
    }

    #[tokio::test]
    async fn test_closure_handler() {
        let handler = Handler::direct(|_request: RouteRequest| async {
            Ok(RouteResponse::text("ok", StatusCode::OK))
        });
        assert_eq!(handler.describe(), "closure");
        let response = handler.resolve().call(RouteRequest::new("GET", "/")).await.unwrap();
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn test_invokable_handler() {
        let handler = Handler::invokable::<Greeter>();
        assert!(handler.describe().ends_with("Greeter"));

        let mut request = RouteRequest::new("GET", "/hello/ada");
        request.params.push("name", "ada");
        let response = handler.resolve().call(request).await.unwrap();
        assert_eq!(
            response.body(),
            &crate::response::ResponseBody::Text("hello ada".to_string())
        );
    }
}
