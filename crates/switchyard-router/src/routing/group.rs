//! Route groups for organizing related routes
//!
//! Groups live in an arena owned by the registry and point at their parent
//! by [`GroupId`]. Prefixes, middleware and REST metadata are resolved by
//! walking that chain, so a route only records the group it was declared in.

use super::registry::RouteRegistry;
use super::trim_path;
use crate::middleware::MiddlewareEntry;

/// Index of a group in its registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(pub(crate) usize);

impl GroupId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Declaration-time group data
#[derive(Debug, Clone, Default)]
pub struct RouteGroup {
    pub(crate) parent: Option<GroupId>,
    pub(crate) prefix: String,
    pub(crate) middleware: Vec<MiddlewareEntry>,
    pub(crate) namespace: Option<String>,
    pub(crate) public: Option<bool>,
    pub(crate) exposed: Option<bool>,
}

impl RouteGroup {
    pub(crate) fn new(parent: Option<GroupId>) -> Self {
        Self {
            parent,
            ..Self::default()
        }
    }

    pub fn parent(&self) -> Option<GroupId> {
        self.parent
    }

    /// Own prefix fragment, without parents
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Own middleware entries, without parents
    pub fn middleware(&self) -> &[MiddlewareEntry] {
        &self.middleware
    }

    /// Own namespace, without parents
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn public(&self) -> Option<bool> {
        self.public
    }

    pub fn exposed(&self) -> Option<bool> {
        self.exposed
    }
}

/// Fluent configuration for a new group.
///
/// Returned by [`RouteRegistry::prefix`], [`RouteRegistry::middleware`] and
/// friends; call [`group`](Self::group) to declare the group's routes.
pub struct GroupBuilder<'r> {
    registry: &'r mut RouteRegistry,
    id: GroupId,
}

impl<'r> GroupBuilder<'r> {
    pub(crate) fn new(registry: &'r mut RouteRegistry, id: GroupId) -> Self {
        Self { registry, id }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Set the group prefix, trimmed of surrounding slashes
    pub fn prefix(self, prefix: &str) -> Self {
        self.registry.group_mut(self.id).prefix = trim_path(prefix).to_string();
        self
    }

    /// Append one middleware entry
    pub fn middleware(self, entry: impl Into<MiddlewareEntry>) -> Self {
        self.registry
            .group_mut(self.id)
            .middleware
            .push(entry.into());
        self
    }

    /// Append middleware entries in order
    pub fn middleware_many<I, E>(self, entries: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<MiddlewareEntry>,
    {
        self.registry
            .group_mut(self.id)
            .middleware
            .extend(entries.into_iter().map(Into::into));
        self
    }

    /// REST namespace, trimmed of surrounding slashes
    pub fn namespace(self, namespace: &str) -> Self {
        self.registry.group_mut(self.id).namespace = Some(trim_path(namespace).to_string());
        self
    }

    pub fn public(self, public: bool) -> Self {
        self.registry.group_mut(self.id).public = Some(public);
        self
    }

    pub fn expose(self, exposed: bool) -> Self {
        self.registry.group_mut(self.id).exposed = Some(exposed);
        self
    }

    /// Open the group, run `routes` inside it, then close it
    pub fn group<F>(self, routes: F) -> GroupId
    where
        F: FnOnce(&mut RouteRegistry),
    {
        self.registry.enter_group(self.id);
        routes(self.registry);
        self.registry.leave_group(self.id);
        self.id
    }
}
