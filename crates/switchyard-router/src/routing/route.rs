//! Declared routes and the handles returned while declaring them

use super::group::GroupId;
use super::pattern::PathPattern;
use super::registry::RouteRegistry;
use super::{trim_path, HttpMethod, Position};
use crate::errors::PatternError;
use crate::handlers::Handler;
use crate::host::PermissionCheck;
use crate::middleware::MiddlewareEntry;

/// A declared route.
///
/// `path` is relative to the owning group; the full path is resolved
/// through the registry that owns the group.
#[derive(Debug, Clone)]
pub struct Route {
    pub(crate) path: String,
    pub(crate) pattern: PathPattern,
    pub(crate) methods: Vec<HttpMethod>,
    pub(crate) handler: Handler,
    pub(crate) name: Option<String>,
    pub(crate) group: Option<GroupId>,
    pub(crate) position: Option<Position>,
    pub(crate) public: Option<bool>,
    pub(crate) exposed: Option<bool>,
    pub(crate) permission: Option<PermissionCheck>,
}

impl Route {
    /// Create an ungrouped route with the default parameter capture.
    ///
    /// An empty method list accepts any method.
    pub fn new(methods: Vec<HttpMethod>, path: &str, handler: Handler) -> Result<Self, PatternError> {
        let path = trim_path(path).to_string();
        let pattern = PathPattern::compile(&path)?;
        Ok(Self::from_parts(path, pattern, methods, handler))
    }

    pub(crate) fn from_parts(
        path: String,
        pattern: PathPattern,
        methods: Vec<HttpMethod>,
        handler: Handler,
    ) -> Self {
        Self {
            path,
            pattern,
            methods,
            handler,
            name: None,
            group: None,
            position: None,
            public: None,
            exposed: None,
            permission: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn in_group(mut self, group: Option<GroupId>) -> Self {
        self.group = group;
        self
    }

    /// Path relative to the owning group
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Pattern compiled from the relative path
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn methods(&self) -> &[HttpMethod] {
        &self.methods
    }

    /// Whether `method` may reach this route; an empty set allows any
    pub fn allows(&self, method: HttpMethod) -> bool {
        self.methods.is_empty() || self.methods.contains(&method)
    }

    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn group(&self) -> Option<GroupId> {
        self.group
    }

    /// Explicit position, `None` when the registry default applies
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub(crate) fn same_method_set(&self, other: &Route) -> bool {
        let mut mine = self.methods.clone();
        let mut theirs = other.methods.clone();
        mine.sort();
        mine.dedup();
        theirs.sort();
        theirs.dedup();
        mine == theirs
    }
}

/// Chainable handle to a freshly declared route
pub struct RouteHandle<'r> {
    registry: &'r mut RouteRegistry,
    index: usize,
}

impl<'r> RouteHandle<'r> {
    pub(crate) fn new(registry: &'r mut RouteRegistry, index: usize) -> Self {
        Self { registry, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Name the route. An older route with the same name is replaced in
    /// its slot by this one.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.index = self.registry.rename(self.index, name.into());
        self
    }

    /// Rewrite rule position
    pub fn position(self, position: Position) -> Self {
        self.registry.route_mut(self.index).position = Some(position);
        self
    }

    pub fn public(self, public: bool) -> Self {
        self.registry.route_mut(self.index).public = Some(public);
        self
    }

    pub fn expose(self, exposed: bool) -> Self {
        self.registry.route_mut(self.index).exposed = Some(exposed);
        self
    }

    /// Explicit REST permission check, overriding public flags
    pub fn permission_callback<F>(self, check: F) -> Self
    where
        F: Fn(&crate::request::RouteRequest) -> bool + Send + Sync + 'static,
    {
        self.registry.route_mut(self.index).permission = Some(PermissionCheck::custom(check));
        self
    }

    pub fn permission(self, permission: PermissionCheck) -> Self {
        self.registry.route_mut(self.index).permission = Some(permission);
        self
    }

    /// Read-only view of the declared route
    pub fn view(&self) -> RouteRef<'_> {
        RouteRef::new(self.registry, self.index)
    }

    /// Full path including group prefixes
    pub fn path(&self) -> String {
        self.view().path()
    }

    pub fn url<I, K, V>(&self, args: I) -> String
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.view().url(args)
    }
}

/// Read-only route view resolved against its registry
#[derive(Clone, Copy)]
pub struct RouteRef<'r> {
    registry: &'r RouteRegistry,
    route: &'r Route,
    index: usize,
}

impl<'r> RouteRef<'r> {
    pub(crate) fn new(registry: &'r RouteRegistry, index: usize) -> Self {
        Self {
            registry,
            route: &registry.routes_slice()[index],
            index,
        }
    }

    pub fn route(&self) -> &'r Route {
        self.route
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> Option<&'r str> {
        self.route.name()
    }

    pub fn methods(&self) -> &'r [HttpMethod] {
        self.route.methods()
    }

    pub fn relative_path(&self) -> &'r str {
        self.route.path()
    }

    /// Group prefix joined with the relative path
    pub fn path(&self) -> String {
        self.registry.full_path(self.route)
    }

    pub fn position(&self) -> Position {
        self.route
            .position
            .unwrap_or(self.registry.config().default_position)
    }

    /// Effective middleware entries, outermost group first
    pub fn middleware(&self) -> Vec<MiddlewareEntry> {
        self.registry.group_middleware(self.route.group)
    }

    /// Namespace of the nearest namespaced group, else the global one
    pub fn namespace(&self) -> String {
        self.registry.group_namespace(self.route.group)
    }

    /// True when the route or any ancestor group is public
    pub fn is_public(&self) -> bool {
        self.route.public == Some(true) || self.registry.group_public(self.route.group)
    }

    /// True when the route or any ancestor group is exposed
    pub fn is_exposed(&self) -> bool {
        self.route.exposed == Some(true) || self.registry.group_exposed(self.route.group)
    }

    /// Explicit check, else allow when public, else deny
    pub fn permission(&self) -> PermissionCheck {
        match &self.route.permission {
            Some(check) => check.clone(),
            None if self.is_public() => PermissionCheck::AllowAll,
            None => PermissionCheck::DenyAll,
        }
    }

    /// Endpoint callback key: the name, else the full path
    pub fn handle(&self) -> String {
        match self.route.name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.path(),
        }
    }

    /// Absolute URL with `args` substituted into the full path
    pub fn url<I, K, V>(&self, args: I) -> String
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.registry.url_for_path(&self.path(), self.route.group, args)
    }
}

impl std::fmt::Debug for RouteRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteRef")
            .field("name", &self.name())
            .field("path", &self.path())
            .field("methods", &self.methods())
            .finish()
    }
}
