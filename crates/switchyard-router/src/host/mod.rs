//! Host collaborators
//!
//! The router never talks to a web platform directly. Registration goes
//! through a [`RewriteFacility`] for rewrite routes and an
//! [`EndpointPublisher`] for REST routes; hosts wire both into a
//! [`HostFacilities`] bundle.

use crate::errors::{RoutingError, RoutingResult};
use crate::request::RouteRequest;
use crate::routing::{HttpMethod, Position};
use std::sync::Arc;

/// One host rewrite rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteRule {
    /// Anchored rule expression, e.g. `^users/([^/]+)$`
    pub regex: String,
    /// Host target, e.g. `index.php?mtwp_route=users%2F%7Bid%7D&id=$matches[1]`
    pub target: String,
    pub position: Position,
}

/// Host rewrite rule facility
pub trait RewriteFacility: Send + Sync {
    /// Make a query variable readable by dispatch
    fn register_query_variable(&self, name: &str, capture: &str);

    fn register_pattern(&self, rule: &RewriteRule);

    /// Fingerprint saved by the last flush, if any
    fn persisted_fingerprint(&self) -> Option<String>;

    fn persist_fingerprint(&self, fingerprint: &str);

    /// Rebuild the host's rule cache
    fn flush_rules(&self);

    /// Flush and persist when `fingerprint` differs from the stored one.
    ///
    /// Returns whether a flush happened.
    fn flush_if_changed(&self, fingerprint: &str) -> bool {
        if self.persisted_fingerprint().as_deref() == Some(fingerprint) {
            tracing::debug!(
                target: "switchyard::registration",
                fingerprint,
                "Route set unchanged, skipping rule flush"
            );
            return false;
        }

        tracing::info!(
            target: "switchyard::registration",
            fingerprint,
            "Route set changed, flushing rewrite rules"
        );
        self.flush_rules();
        self.persist_fingerprint(fingerprint);
        true
    }
}

/// Access decision attached to a published endpoint
#[derive(Clone)]
pub enum PermissionCheck {
    AllowAll,
    DenyAll,
    Custom(Arc<dyn Fn(&RouteRequest) -> bool + Send + Sync>),
}

impl PermissionCheck {
    pub fn custom<F>(check: F) -> Self
    where
        F: Fn(&RouteRequest) -> bool + Send + Sync + 'static,
    {
        PermissionCheck::Custom(Arc::new(check))
    }

    pub fn allows(&self, request: &RouteRequest) -> bool {
        match self {
            PermissionCheck::AllowAll => true,
            PermissionCheck::DenyAll => false,
            PermissionCheck::Custom(check) => check(request),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PermissionCheck::AllowAll => "allow_all",
            PermissionCheck::DenyAll => "deny_all",
            PermissionCheck::Custom(_) => "custom",
        }
    }
}

impl std::fmt::Debug for PermissionCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Namespaced endpoint handed to the host's REST layer
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub namespace: String,
    /// Full path template, e.g. `users/{id}`
    pub path: String,
    /// Anchored path expression
    pub pattern: String,
    /// Empty means any method
    pub methods: Vec<HttpMethod>,
    pub permission: PermissionCheck,
    /// Key passed back to `Dispatcher::dispatch_handle`
    pub handle: String,
}

/// Host REST endpoint publisher
pub trait EndpointPublisher: Send + Sync {
    fn publish(&self, endpoint: &Endpoint);
}

/// Host collaborators available to registration
#[derive(Clone, Default)]
pub struct HostFacilities {
    rewrite: Option<Arc<dyn RewriteFacility>>,
    publisher: Option<Arc<dyn EndpointPublisher>>,
}

impl HostFacilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rewrite(mut self, facility: Arc<dyn RewriteFacility>) -> Self {
        self.rewrite = Some(facility);
        self
    }

    pub fn with_publisher(mut self, publisher: Arc<dyn EndpointPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn rewrite(&self) -> RoutingResult<&Arc<dyn RewriteFacility>> {
        self.rewrite
            .as_ref()
            .ok_or_else(|| RoutingError::missing_collaborator("rewrite facility"))
    }

    pub fn publisher(&self) -> RoutingResult<&Arc<dyn EndpointPublisher>> {
        self.publisher
            .as_ref()
            .ok_or_else(|| RoutingError::missing_collaborator("endpoint publisher"))
    }
}

impl std::fmt::Debug for HostFacilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostFacilities")
            .field("rewrite", &self.rewrite.is_some())
            .field("publisher", &self.publisher.is_some())
            .finish()
    }
}
