use super::definitions::{DefinitionLoader, RouteDefinitions, RouteSet};
use crate::config::RouterConfig;
use crate::dispatch::{DispatchOutcome, Dispatcher};
use crate::errors::RoutingResult;
use crate::host::HostFacilities;
use crate::middleware::MiddlewareRegistry;
use crate::request::RouteRequest;
use crate::response::{RenderedResponse, Responder};
use crate::routing::Flavor;
use parking_lot::Mutex;
use std::sync::Arc;
use switchyard_core::AppConfigTrait;

/// Summary of one registration pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationReport {
    pub rewrite_routes: usize,
    pub rest_routes: usize,
    /// Whether the host rewrite rule cache was flushed
    pub flushed: bool,
    /// Fingerprint of the rewrite route set
    pub fingerprint: String,
}

/// Owns the registries, registers them with the host and serves requests.
///
/// Declaration and registration hold a single-writer lock; dispatch reads
/// the last published table snapshot without locking.
pub struct RouteService {
    config: Arc<RouterConfig>,
    middleware: Arc<MiddlewareRegistry>,
    host: HostFacilities,
    loader: DefinitionLoader,
    routes: Mutex<RouteSet>,
    rewrite: Arc<Dispatcher>,
    rest: Arc<Dispatcher>,
    responder: Responder,
}

impl RouteService {
    /// Fails when the configuration does not validate
    pub fn new(config: RouterConfig, host: HostFacilities) -> RoutingResult<Self> {
        config.validate()?;
        let config = Arc::new(config);

        Ok(Self {
            middleware: Arc::new(MiddlewareRegistry::new()),
            host,
            loader: DefinitionLoader::new(),
            routes: Mutex::new(RouteSet::new(Arc::clone(&config))),
            rewrite: Arc::new(Dispatcher::empty(Flavor::Rewrite, Arc::clone(&config))),
            rest: Arc::new(Dispatcher::empty(Flavor::Rest, Arc::clone(&config))),
            responder: Responder::new(),
            config,
        })
    }

    pub fn with_middleware(mut self, middleware: MiddlewareRegistry) -> Self {
        self.middleware = Arc::new(middleware);
        self
    }

    pub fn with_responder(mut self, responder: Responder) -> Self {
        self.responder = responder;
        self
    }

    /// Add definitions run by the next [`register`](Self::register)
    pub fn with_definitions<D: RouteDefinitions + 'static>(mut self, definitions: D) -> Self {
        self.loader.add(definitions);
        self
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Declare routes directly; they are kept until the next reload
    pub fn declare<F, T>(&self, routes: F) -> T
    where
        F: FnOnce(&mut RouteSet) -> T,
    {
        let mut set = self.routes.lock();
        routes(&mut *set)
    }

    /// Load definitions once, then register both flavors with the host.
    ///
    /// Both tables compile and every collaborator they need is present
    /// before the host is touched; dispatchers then switch together.
    pub fn register(&self) -> RoutingResult<RegistrationReport> {
        let mut set = self.routes.lock();
        self.loader.load(&mut *set);
        self.register_set(&mut *set)
    }

    /// Rebuild every registry from the definitions and register again
    pub fn reload(&self) -> RoutingResult<RegistrationReport> {
        let mut fresh = RouteSet::new(Arc::clone(&self.config));
        self.loader.reload(&mut fresh);

        let mut set = self.routes.lock();
        let report = self.register_set(&mut fresh)?;
        *set = fresh;
        tracing::info!(
            target: "switchyard::bootstrap",
            routes = report.rewrite_routes + report.rest_routes,
            "Route definitions reloaded"
        );
        Ok(report)
    }

    fn register_set(&self, set: &mut RouteSet) -> RoutingResult<RegistrationReport> {
        let rewrite_table = set.rewrite.compile(&self.middleware)?;
        let rest_table = set.rest.compile(&self.middleware)?;
        set.rewrite.ensure_host(&rewrite_table, &self.host)?;
        set.rest.ensure_host(&rest_table, &self.host)?;

        let rewrite = set.rewrite.register_table(rewrite_table, &self.host)?;
        let rest = set.rest.register_table(rest_table, &self.host)?;

        let report = RegistrationReport {
            rewrite_routes: rewrite.table.len(),
            rest_routes: rest.table.len(),
            flushed: rewrite.flushed,
            fingerprint: rewrite.table.fingerprint().to_string(),
        };

        self.rewrite.publish(rewrite.table);
        self.rest.publish(rest.table);
        Ok(report)
    }

    pub fn dispatcher(&self, flavor: Flavor) -> &Arc<Dispatcher> {
        match flavor {
            Flavor::Rewrite => &self.rewrite,
            Flavor::Rest => &self.rest,
        }
    }

    /// Dispatch a request the host's rewrite layer already matched
    pub async fn handle_rewrite(&self, request: RouteRequest) -> DispatchOutcome {
        self.rewrite.dispatch_rewrite(request).await
    }

    /// Dispatch a REST request by path and method
    pub async fn handle_rest(&self, request: RouteRequest) -> DispatchOutcome {
        self.rest.dispatch_direct(request).await
    }

    /// Invoke the REST endpoint published under `handle`
    pub async fn handle_endpoint(&self, handle: &str, request: RouteRequest) -> DispatchOutcome {
        self.rest.dispatch_handle(handle, request).await
    }

    pub fn respond(&self, outcome: DispatchOutcome) -> RoutingResult<Option<RenderedResponse>> {
        self.responder.respond(outcome)
    }

    /// URL of the named route in either flavor, rewrite first
    pub fn url<I, K, V>(&self, name: &str, args: I) -> Option<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let rewrite = self.rewrite.table();
        let rest = self.rest.table();
        rewrite
            .find_by_name(name)
            .or_else(|| rest.find_by_name(name))
            .map(|route| route.url(args))
    }

    /// `<script>` exposing the named, exposed REST routes
    pub fn expose_script(&self) -> String {
        self.rest.table().expose_script()
    }
}

impl std::fmt::Debug for RouteService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteService")
            .field("middleware", &self.middleware.names())
            .field("loader", &self.loader)
            .field("rewrite_routes", &self.rewrite.table().len())
            .field("rest_routes", &self.rest.table().len())
            .field("responder", &self.responder)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RoutingError;

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = RouterConfig::default();
        config.route_query_var = String::new();
        let err = RouteService::new(config, HostFacilities::new()).unwrap_err();
        assert!(matches!(err, RoutingError::Config { .. }));
    }

    #[test]
    fn test_empty_service_registers_without_host() {
        let service = RouteService::new(RouterConfig::default(), HostFacilities::new()).unwrap();
        let report = service.register().unwrap();
        assert_eq!(report.rewrite_routes, 0);
        assert_eq!(report.rest_routes, 0);
        assert!(!report.flushed);
    }
}
