//! Request dispatch
//!
//! A [`Dispatcher`] reads an immutable [`RouteTable`] snapshot, resolves
//! the request to a route, and runs the route's middleware chain with the
//! handler as terminal. Every request ends in exactly one
//! [`DispatchOutcome`].

mod outcome;

pub use outcome::{DispatchOutcome, DispatchState};

use crate::config::RouterConfig;
use crate::request::RouteRequest;
use crate::routing::{CompiledRoute, Flavor, Resolution, RouteParams, RouteTable};
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Per-flavor request dispatcher.
///
/// The table is swapped atomically; requests in flight keep the snapshot
/// they started with.
#[derive(Debug)]
pub struct Dispatcher {
    flavor: Flavor,
    table: ArcSwap<RouteTable>,
}

impl Dispatcher {
    pub fn new(table: RouteTable) -> Self {
        Self {
            flavor: table.flavor(),
            table: ArcSwap::from_pointee(table),
        }
    }

    /// Dispatcher over an empty table
    pub fn empty(flavor: Flavor, config: Arc<RouterConfig>) -> Self {
        Self::new(RouteTable::empty(flavor, config))
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// Current snapshot
    pub fn table(&self) -> Arc<RouteTable> {
        self.table.load_full()
    }

    /// Replace the snapshot for subsequent requests
    pub fn publish(&self, table: RouteTable) {
        tracing::debug!(
            target: "switchyard::dispatch",
            flavor = %self.flavor,
            routes = table.len(),
            fingerprint = table.fingerprint(),
            "Route table published"
        );
        self.table.store(Arc::new(table));
    }

    /// Dispatch by this dispatcher's flavor
    pub async fn dispatch(&self, request: RouteRequest) -> DispatchOutcome {
        match self.flavor {
            Flavor::Rewrite => self.dispatch_rewrite(request).await,
            Flavor::Rest => self.dispatch_direct(request).await,
        }
    }

    /// Resolve through the host's route query variable.
    ///
    /// A missing or empty variable means the request is not ours.
    pub async fn dispatch_rewrite(&self, request: RouteRequest) -> DispatchOutcome {
        let table = self.table();
        let route_var = request
            .route_var(&table.config().route_query_var)
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        let Some(route_var) = route_var else {
            tracing::debug!(
                target: "switchyard::dispatch",
                path = %request.path,
                state = %DispatchState::Passthrough,
                "No route query variable, deferring to host"
            );
            return DispatchOutcome::Passthrough;
        };

        let resolution = table.resolve_route_var(&route_var, &request);
        self.finish(resolution, request).await
    }

    /// Resolve by matching the request path against every route pattern
    pub async fn dispatch_direct(&self, request: RouteRequest) -> DispatchOutcome {
        let table = self.table();
        let resolution =
            table.resolve_path(&request.path, &request.method, request.namespace.as_deref());
        self.finish(resolution, request).await
    }

    /// Run the route published under `handle`, as the host's REST layer
    /// does when it invokes an endpoint callback.
    pub async fn dispatch_handle(&self, handle: &str, mut request: RouteRequest) -> DispatchOutcome {
        let table = self.table();
        let Some(route) = table.find_by_handle(handle).cloned() else {
            tracing::debug!(
                target: "switchyard::dispatch",
                handle,
                state = %DispatchState::NotFound,
                "Unknown endpoint handle"
            );
            return DispatchOutcome::NotFound;
        };

        let params = route
            .pattern()
            .matches(crate::routing::trim_path(&request.path))
            .unwrap_or_else(|| std::mem::take(&mut request.params));
        run_route(route, params, request).await
    }

    async fn finish(&self, resolution: Resolution, request: RouteRequest) -> DispatchOutcome {
        match resolution {
            Resolution::Matched { route, params } => {
                tracing::debug!(
                    target: "switchyard::dispatch",
                    route = route.handle(),
                    method = %request.method,
                    state = %DispatchState::Matched,
                    "Route matched"
                );
                run_route(route, params, request).await
            }
            Resolution::NotFound => {
                tracing::debug!(
                    target: "switchyard::dispatch",
                    path = %request.path,
                    method = %request.method,
                    state = %DispatchState::NotFound,
                    "No route matched"
                );
                DispatchOutcome::NotFound
            }
            Resolution::MethodNotAllowed { allowed } => {
                tracing::debug!(
                    target: "switchyard::dispatch",
                    path = %request.path,
                    method = %request.method,
                    state = %DispatchState::MethodNotAllowed,
                    "Path matched without an allowed method"
                );
                DispatchOutcome::MethodNotAllowed { allowed }
            }
        }
    }
}

/// Run the route's chain with its handler as terminal
async fn run_route(
    route: Arc<CompiledRoute>,
    params: RouteParams,
    mut request: RouteRequest,
) -> DispatchOutcome {
    request.params = params;
    if request.namespace.is_none() && !route.namespace().is_empty() {
        request.namespace = Some(route.namespace().to_string());
    }

    let handler = Arc::clone(route.handler());
    let result = route
        .middleware()
        .run(request, move |req| handler.call(req))
        .await;

    let name = route.handle().to_string();
    match result {
        Ok(response) => {
            tracing::debug!(
                target: "switchyard::dispatch",
                route = %name,
                status = response.status_code().as_u16(),
                state = %DispatchState::Completed,
                "Route completed"
            );
            DispatchOutcome::Completed {
                route: name,
                response,
            }
        }
        Err(error) => {
            tracing::error!(
                target: "switchyard::dispatch",
                route = %name,
                kind = %error.kind,
                error = %error.message,
                state = %DispatchState::Failed,
                "Route chain failed"
            );
            DispatchOutcome::Failed { route: name, error }
        }
    }
}
