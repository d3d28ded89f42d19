//! Per-flavor route registry
//!
//! The registry is the mutable declaration-time store: routes are declared
//! into it (inside nested groups), looked up by name or path, fingerprinted,
//! and finally compiled into an immutable [`RouteTable`] that is handed to
//! the host and to dispatchers.

use super::fingerprint::{fingerprint, FingerprintEntry};
use super::group::{GroupBuilder, GroupId, RouteGroup};
use super::pattern::PathPattern;
use super::route::{Route, RouteHandle, RouteRef};
use super::table::{CompiledRoute, RouteTable};
use super::{join_path, trim_path, Flavor, HttpMethod};
use crate::config::RouterConfig;
use crate::errors::{RoutingError, RoutingResult};
use crate::handlers::{Handler, RouteHandler};
use crate::host::HostFacilities;
use crate::middleware::{MiddlewareEntry, MiddlewareRegistry};
use std::collections::HashSet;
use std::sync::Arc;

/// Outcome of a registration pass
#[derive(Debug)]
pub struct Registration {
    pub table: RouteTable,
    /// Whether the host rule cache was flushed
    pub flushed: bool,
}

/// Ordered route collection plus the group arena routes are declared in
#[derive(Debug)]
pub struct RouteRegistry {
    flavor: Flavor,
    config: Arc<RouterConfig>,
    allowed: Vec<HttpMethod>,
    routes: Vec<Route>,
    groups: Vec<RouteGroup>,
    group_stack: Vec<GroupId>,
    rejected: Vec<RoutingError>,
    last_fingerprint: Option<String>,
}

impl RouteRegistry {
    pub fn new(flavor: Flavor, config: RouterConfig) -> Self {
        Self::with_shared_config(flavor, Arc::new(config))
    }

    pub fn with_shared_config(flavor: Flavor, config: Arc<RouterConfig>) -> Self {
        let allowed = config.allowed();
        Self {
            flavor,
            config,
            allowed,
            routes: Vec::new(),
            groups: Vec::new(),
            group_stack: Vec::new(),
            rejected: Vec::new(),
            last_fingerprint: None,
        }
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn allowed_methods(&self) -> &[HttpMethod] {
        &self.allowed
    }

    /// Declarations dropped so far, oldest first
    pub fn rejected(&self) -> &[RoutingError] {
        &self.rejected
    }

    // ----- declarations -------------------------------------------------

    /// Declare a route, reporting why it cannot be declared.
    ///
    /// Method names are uppercased and filtered against the allowed list;
    /// the route joins the current group.
    pub fn try_match_methods<M: AsRef<str>>(
        &mut self,
        methods: &[M],
        path: &str,
        handler: Handler,
    ) -> RoutingResult<RouteHandle<'_>> {
        let route = self.prepare(methods, path, handler)?;
        let index = self.update(route);
        Ok(RouteHandle::new(self, index))
    }

    /// Declare a route; `None` when no requested method is allowed or the
    /// path is not a valid template.
    pub fn match_handler<M: AsRef<str>>(
        &mut self,
        methods: &[M],
        path: &str,
        handler: Handler,
    ) -> Option<RouteHandle<'_>> {
        match self.prepare(methods, path, handler) {
            Ok(route) => {
                let index = self.update(route);
                Some(RouteHandle::new(self, index))
            }
            Err(err) => {
                self.reject(err);
                None
            }
        }
    }

    pub fn match_methods<M, H>(&mut self, methods: &[M], path: &str, handler: H) -> Option<RouteHandle<'_>>
    where
        M: AsRef<str>,
        H: RouteHandler + 'static,
    {
        self.match_handler(methods, path, Handler::direct(handler))
    }

    /// Declare a route for every allowed method
    pub fn any<H: RouteHandler + 'static>(&mut self, path: &str, handler: H) -> Option<RouteHandle<'_>> {
        let methods: Vec<&'static str> = self.allowed.iter().map(HttpMethod::as_str).collect();
        self.match_methods(methods.as_slice(), path, handler)
    }

    pub fn get<H: RouteHandler + 'static>(&mut self, path: &str, handler: H) -> Option<RouteHandle<'_>> {
        self.match_methods(&["GET"], path, handler)
    }

    pub fn post<H: RouteHandler + 'static>(&mut self, path: &str, handler: H) -> Option<RouteHandle<'_>> {
        self.match_methods(&["POST"], path, handler)
    }

    pub fn put<H: RouteHandler + 'static>(&mut self, path: &str, handler: H) -> Option<RouteHandle<'_>> {
        self.match_methods(&["PUT"], path, handler)
    }

    pub fn patch<H: RouteHandler + 'static>(&mut self, path: &str, handler: H) -> Option<RouteHandle<'_>> {
        self.match_methods(&["PATCH"], path, handler)
    }

    pub fn delete<H: RouteHandler + 'static>(&mut self, path: &str, handler: H) -> Option<RouteHandle<'_>> {
        self.match_methods(&["DELETE"], path, handler)
    }

    pub fn options<H: RouteHandler + 'static>(&mut self, path: &str, handler: H) -> Option<RouteHandle<'_>> {
        self.match_methods(&["OPTIONS"], path, handler)
    }

    fn prepare<M: AsRef<str>>(&self, methods: &[M], path: &str, handler: Handler) -> RoutingResult<Route> {
        let filtered = self.filter_methods(methods);
        if filtered.is_empty() {
            return Err(RoutingError::no_allowed_methods(methods));
        }

        let path = trim_path(path).to_string();
        let pattern = PathPattern::compile_with_capture(&path, &self.config.param_capture)
            .map_err(|err| RoutingError::invalid_pattern(path.as_str(), err))?;

        Ok(Route::from_parts(path, pattern, filtered, handler).in_group(self.current_group()))
    }

    fn filter_methods<M: AsRef<str>>(&self, methods: &[M]) -> Vec<HttpMethod> {
        let mut filtered = Vec::new();
        for method in methods {
            if let Ok(method) = method.as_ref().parse::<HttpMethod>() {
                if self.allowed.contains(&method) && !filtered.contains(&method) {
                    filtered.push(method);
                }
            }
        }
        filtered
    }

    fn reject(&mut self, err: RoutingError) {
        if self.config.strict_methods {
            tracing::error!(
                target: "switchyard::declaration",
                flavor = %self.flavor,
                error = %err,
                "Route declaration rejected"
            );
        } else {
            tracing::warn!(
                target: "switchyard::declaration",
                flavor = %self.flavor,
                error = %err,
                "Route declaration dropped"
            );
        }
        self.rejected.push(err);
    }

    // ----- collection ---------------------------------------------------

    /// Append without replacement; returns the new index
    pub fn add(&mut self, route: Route) -> usize {
        self.routes.push(route);
        self.routes.len() - 1
    }

    /// Upsert: replace the route sharing the name, or the same full path
    /// and method set, in place; otherwise append. Later routes matching
    /// either key are removed so neither key is left duplicated.
    pub fn update(&mut self, route: Route) -> usize {
        let full = self.full_path(&route);
        let matches: Vec<usize> = (0..self.routes.len())
            .filter(|&i| {
                let other = &self.routes[i];
                (route.name.is_some() && other.name == route.name)
                    || (other.same_method_set(&route) && self.full_path(other) == full)
            })
            .collect();

        let Some((&index, stale)) = matches.split_first() else {
            return self.add(route);
        };

        for &i in stale.iter().rev() {
            self.routes.remove(i);
        }
        tracing::debug!(
            target: "switchyard::declaration",
            path = %full,
            index,
            removed = stale.len(),
            "Route replaced in place"
        );
        self.routes[index] = route;
        index
    }

    /// Name the route at `index`, moving it into the slot of an older
    /// route with the same name. Returns the route's final index.
    pub(crate) fn rename(&mut self, index: usize, name: String) -> usize {
        let older = (0..self.routes.len())
            .find(|&i| i != index && self.routes[i].name.as_deref() == Some(name.as_str()));

        self.routes[index].name = Some(name);
        match older {
            Some(older) => {
                let route = self.routes.remove(index);
                let slot = if older > index { older - 1 } else { older };
                self.routes[slot] = route;
                slot
            }
            None => index,
        }
    }

    pub(crate) fn route_mut(&mut self, index: usize) -> &mut Route {
        &mut self.routes[index]
    }

    pub(crate) fn routes_slice(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn get_route(&self, index: usize) -> Option<RouteRef<'_>> {
        (index < self.routes.len()).then(|| RouteRef::new(self, index))
    }

    /// Routes in declaration order
    pub fn routes(&self) -> impl Iterator<Item = RouteRef<'_>> {
        (0..self.routes.len()).map(move |index| RouteRef::new(self, index))
    }

    pub fn find_by_name(&self, name: &str) -> Option<RouteRef<'_>> {
        self.routes().find(|route| route.name() == Some(name))
    }

    /// First route whose full path equals `path` and that allows `method`
    pub fn find_by_path_and_method(&self, path: &str, method: &str) -> Option<RouteRef<'_>> {
        let path = trim_path(path);
        let method = method.parse::<HttpMethod>().ok();
        self.routes().find(|route| {
            let allows = route.methods().is_empty()
                || method.map_or(false, |m| route.methods().contains(&m));
            allows && route.path() == path
        })
    }

    pub fn exists(&self, name: &str) -> bool {
        self.find_by_name(name).is_some()
    }

    /// URL of the named route with `args` substituted
    pub fn route_url<I, K, V>(&self, name: &str, args: I) -> Option<String>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.find_by_name(name).map(|route| route.url(args))
    }

    // ----- groups -------------------------------------------------------

    /// Create a group under the current one without opening it
    pub fn new_group(&mut self) -> GroupBuilder<'_> {
        let id = GroupId(self.groups.len());
        self.groups.push(RouteGroup::new(self.current_group()));
        GroupBuilder::new(self, id)
    }

    pub fn prefix(&mut self, prefix: &str) -> GroupBuilder<'_> {
        self.new_group().prefix(prefix)
    }

    pub fn middleware(&mut self, entry: impl Into<MiddlewareEntry>) -> GroupBuilder<'_> {
        self.new_group().middleware(entry)
    }

    pub fn namespace(&mut self, namespace: &str) -> GroupBuilder<'_> {
        self.new_group().namespace(namespace)
    }

    /// Declare routes inside a new unprefixed group
    pub fn group<F>(&mut self, routes: F) -> GroupId
    where
        F: FnOnce(&mut RouteRegistry),
    {
        self.new_group().group(routes)
    }

    /// Create a group under the current one and make it current
    pub fn open_group(&mut self) -> GroupId {
        let id = self.new_group().id();
        self.enter_group(id);
        id
    }

    /// Close the current group, restoring its parent as current
    pub fn close_group(&mut self) -> RoutingResult<GroupId> {
        self.group_stack.pop().ok_or(RoutingError::GroupStackEmpty)
    }

    pub fn current_group(&self) -> Option<GroupId> {
        self.group_stack.last().copied()
    }

    pub(crate) fn enter_group(&mut self, id: GroupId) {
        self.group_stack.push(id);
    }

    /// Pop back to and including `id`; groups left open inside it are closed
    pub(crate) fn leave_group(&mut self, id: GroupId) {
        match self.group_stack.iter().rposition(|&open| open == id) {
            Some(depth) => {
                let leaked = self.group_stack.len() - depth - 1;
                if leaked > 0 {
                    tracing::error!(
                        target: "switchyard::declaration",
                        group = id.index(),
                        leaked,
                        "Groups left open inside a group scope were closed"
                    );
                }
                self.group_stack.truncate(depth);
            }
            None => {
                tracing::error!(
                    target: "switchyard::declaration",
                    group = id.index(),
                    "Group scope closed after its group was already closed"
                );
            }
        }
    }

    pub fn get_group(&self, id: GroupId) -> Option<&RouteGroup> {
        self.groups.get(id.0)
    }

    pub(crate) fn group_mut(&mut self, id: GroupId) -> &mut RouteGroup {
        &mut self.groups[id.0]
    }

    /// `group` and its ancestors, innermost first
    fn lineage(&self, group: Option<GroupId>) -> Vec<&RouteGroup> {
        let mut lineage = Vec::new();
        let mut current = group;
        while let Some(id) = current {
            let Some(group) = self.groups.get(id.0) else {
                break;
            };
            lineage.push(group);
            current = group.parent;
        }
        lineage
    }

    /// Ancestor prefixes joined outermost first
    pub fn group_prefix(&self, group: Option<GroupId>) -> String {
        join_path(self.lineage(group).iter().rev().map(|g| g.prefix.as_str()))
    }

    /// Ancestor middleware, outermost first, blank entries removed
    pub fn group_middleware(&self, group: Option<GroupId>) -> Vec<MiddlewareEntry> {
        self.lineage(group)
            .iter()
            .rev()
            .flat_map(|g| g.middleware.iter().cloned())
            .filter(|entry| !entry.is_empty())
            .collect()
    }

    /// Nearest namespace up the chain, else the global namespace
    pub fn group_namespace(&self, group: Option<GroupId>) -> String {
        self.lineage(group)
            .iter()
            .find_map(|g| g.namespace.as_deref().filter(|ns| !ns.is_empty()))
            .unwrap_or(trim_path(&self.config.global_namespace))
            .to_string()
    }

    /// Nearest explicit public flag up the chain
    pub fn group_public(&self, group: Option<GroupId>) -> bool {
        self.lineage(group)
            .iter()
            .find_map(|g| g.public)
            .unwrap_or(false)
    }

    /// Nearest explicit expose flag up the chain
    pub fn group_exposed(&self, group: Option<GroupId>) -> bool {
        self.lineage(group)
            .iter()
            .find_map(|g| g.exposed)
            .unwrap_or(false)
    }

    /// Group prefix joined with the route's relative path
    pub fn full_path(&self, route: &Route) -> String {
        join_path([self.group_prefix(route.group).as_str(), route.path.as_str()])
    }

    fn base_url(&self, group: Option<GroupId>) -> String {
        match self.flavor {
            Flavor::Rewrite => format!("{}/", self.config.home_url.trim_end_matches('/')),
            Flavor::Rest => format!(
                "{}/{}/",
                self.config.rest_url.trim_end_matches('/'),
                self.group_namespace(group)
            ),
        }
    }

    pub(crate) fn url_for_path<I, K, V>(&self, full_path: &str, group: Option<GroupId>, args: I) -> String
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let built = match PathPattern::compile_with_capture(full_path, &self.config.param_capture) {
            Ok(pattern) => pattern.build(args),
            Err(_) => args.into_iter().fold(full_path.to_string(), |path, (k, v)| {
                path.replace(&format!("{{{}}}", k.as_ref()), v.as_ref())
            }),
        };
        format!("{}{}", self.base_url(group), built)
    }

    // ----- fingerprint and registration ---------------------------------

    fn fingerprint_entries(&self) -> Vec<FingerprintEntry> {
        self.routes()
            .map(|route| {
                FingerprintEntry::new(route.name(), route.path(), route.methods(), route.position())
            })
            .collect()
    }

    /// Fingerprint of the current route set
    pub fn fingerprint(&self) -> String {
        fingerprint(&self.fingerprint_entries())
    }

    /// Fingerprint recorded by the last successful registration
    pub fn last_fingerprint(&self) -> Option<&str> {
        self.last_fingerprint.as_deref()
    }

    /// Compile the declared routes into an immutable table.
    ///
    /// Routes whose full path is not a valid template are skipped with an
    /// error log. Unresolved middleware names are dropped, or fail the
    /// compile under `strict_middleware`.
    pub fn compile(&self, middleware: &MiddlewareRegistry) -> RoutingResult<RouteTable> {
        if self.config.strict_methods {
            if let Some(err) = self.rejected.first() {
                return Err(err.clone());
            }
        }

        let mut compiled = Vec::with_capacity(self.routes.len());
        for route in self.routes() {
            let path = route.path();
            let pattern = match PathPattern::compile_with_capture(&path, &self.config.param_capture) {
                Ok(pattern) => pattern,
                Err(err) => {
                    tracing::error!(
                        target: "switchyard::registration",
                        path = %path,
                        error = %err,
                        "Route skipped, full path is not a valid template"
                    );
                    continue;
                }
            };

            let chain =
                middleware.resolve_entries(&route.middleware(), self.config.strict_middleware)?;

            compiled.push(Arc::new(CompiledRoute {
                name: route.name().map(str::to_string),
                path,
                pattern,
                methods: route.methods().to_vec(),
                handler: route.route().handler().resolve(),
                middleware: chain,
                position: route.position(),
                namespace: route.namespace(),
                exposed: route.is_exposed(),
                permission: route.permission(),
                base_url: self.base_url(route.route().group()),
            }));
        }

        Ok(RouteTable::new(
            self.flavor,
            Arc::clone(&self.config),
            compiled,
            self.fingerprint(),
        ))
    }

    /// Compile and hand every route to the host.
    ///
    /// Rewrite routes become query variables and rules, followed by a flush
    /// when the fingerprint changed; REST routes become published endpoints.
    /// An empty registry touches no host collaborator.
    pub fn register_all(
        &mut self,
        host: &HostFacilities,
        middleware: &MiddlewareRegistry,
    ) -> RoutingResult<Registration> {
        let table = self.compile(middleware)?;
        self.register_table(table, host)
    }

    /// Collaborator `table` needs, checked before anything is registered
    pub fn ensure_host(&self, table: &RouteTable, host: &HostFacilities) -> RoutingResult<()> {
        if table.is_empty() {
            return Ok(());
        }
        match self.flavor {
            Flavor::Rewrite => host.rewrite().map(|_| ()),
            Flavor::Rest => host.publisher().map(|_| ()),
        }
    }

    /// Register an already compiled table with the host
    pub fn register_table(
        &mut self,
        table: RouteTable,
        host: &HostFacilities,
    ) -> RoutingResult<Registration> {
        if table.is_empty() {
            return Ok(Registration {
                table,
                flushed: false,
            });
        }

        let mut flushed = false;
        match self.flavor {
            Flavor::Rewrite => {
                let facility = host.rewrite()?;
                let capture = self.config.param_capture.as_str();
                facility.register_query_variable(&self.config.route_query_var, capture);

                let mut registered = HashSet::new();
                for route in table.iter() {
                    for param in route.pattern().param_names() {
                        if registered.insert(param.clone()) {
                            facility.register_query_variable(param, capture);
                        }
                    }
                    facility.register_pattern(
                        &route.rewrite_rule(&self.config.route_query_var, &self.config.rewrite_target),
                    );
                }
                flushed = facility.flush_if_changed(table.fingerprint());
            }
            Flavor::Rest => {
                let publisher = host.publisher()?;
                for route in table.iter() {
                    publisher.publish(&route.endpoint());
                }
            }
        }

        tracing::info!(
            target: "switchyard::registration",
            flavor = %self.flavor,
            routes = table.len(),
            flushed,
            fingerprint = table.fingerprint(),
            "Routes registered"
        );

        self.last_fingerprint = Some(table.fingerprint().to_string());
        Ok(Registration { table, flushed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::RouteRequest;
    use crate::response::RouteResponse;
    use crate::routing::Position;

    async fn ok(_request: RouteRequest) -> crate::errors::MiddlewareResult {
        Ok(RouteResponse::ok())
    }

    fn rewrite() -> RouteRegistry {
        RouteRegistry::new(
            Flavor::Rewrite,
            RouterConfig::default().with_home_url("http://testsite.local"),
        )
    }

    #[test]
    fn test_method_filtering() {
        let mut registry = rewrite();
        assert!(registry.match_methods(&["foo"], "a", ok).is_none());
        assert_eq!(registry.len(), 0);
        assert_eq!(registry.rejected().len(), 1);

        let handle = registry.match_methods(&["get", "foo", "GET"], "a", ok).unwrap();
        assert_eq!(handle.view().methods(), &[HttpMethod::GET]);
    }

    #[test]
    fn test_try_match_methods_reports_reason() {
        let mut registry = rewrite();
        let err = registry
            .try_match_methods(&["TRACE"], "a", Handler::direct(ok))
            .err()
            .unwrap();
        assert!(matches!(err, RoutingError::NoAllowedMethods { requested } if requested == vec!["TRACE"]));

        let err = registry
            .try_match_methods(&["GET"], "a/{x}/{x}", Handler::direct(ok))
            .err()
            .unwrap();
        assert_eq!(err.error_code(), "INVALID_ROUTE_PATTERN");
    }

    #[test]
    fn test_any_uses_all_allowed_methods() {
        let mut registry = rewrite();
        let handle = registry.any("ping", ok).unwrap();
        assert_eq!(handle.view().methods().len(), 6);
    }

    #[test]
    fn test_update_replaces_by_name_in_place() {
        let mut registry = rewrite();
        registry.get("a", ok).unwrap().name("first");
        registry.get("b", ok).unwrap().name("target");
        registry.get("c", ok).unwrap();
        assert_eq!(registry.len(), 3);

        let replacement = Route::new(vec![HttpMethod::POST], "z", Handler::direct(ok))
            .unwrap()
            .named("target");
        let index = registry.update(replacement);

        assert_eq!(index, 1);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.find_by_name("target").unwrap().path(), "z");
    }

    #[test]
    fn test_update_matching_both_keys_leaves_no_duplicate() {
        let mut registry = rewrite();
        registry.get("a", ok).unwrap().name("x");
        registry.get("b", ok);

        let replacement = Route::new(vec![HttpMethod::GET], "b", Handler::direct(ok))
            .unwrap()
            .named("x");
        assert_eq!(registry.update(replacement), 0);

        let routes: Vec<(String, Option<String>)> = registry
            .routes()
            .map(|r| (r.path(), r.name().map(str::to_string)))
            .collect();
        assert_eq!(routes, vec![("b".to_string(), Some("x".to_string()))]);
        assert!(registry.find_by_path_and_method("a", "GET").is_none());
    }

    #[test]
    fn test_redeclaring_same_path_and_methods_replaces() {
        let mut registry = rewrite();
        registry.get("a", ok);
        registry.post("a", ok);
        registry.get("/a/", ok);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_renaming_collapses_duplicate_names() {
        let mut registry = rewrite();
        registry.get("old", ok).unwrap().name("dup");
        registry.get("middle", ok);
        let handle = registry.get("new", ok).unwrap().name("dup");
        assert_eq!(handle.index(), 0);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.find_by_name("dup").unwrap().path(), "new");
        assert_eq!(registry.routes().filter(|r| r.name() == Some("dup")).count(), 1);
    }

    #[test]
    fn test_find_by_path_and_method() {
        let mut registry = rewrite();
        registry.put("foo/bar", ok).unwrap().name("put-route");
        registry.get("foo/bar", ok).unwrap().name("get-route");
        registry.post("foo/bar", ok).unwrap().name("post-route");

        let route = registry.find_by_path_and_method("foo/bar", "GET").unwrap();
        assert_eq!(route.name(), Some("get-route"));
        assert!(registry.find_by_path_and_method("/foo/bar/", "post").is_some());
        assert!(registry.find_by_path_and_method("foo/baz", "GET").is_none());
        assert!(registry.find_by_path_and_method("foo/bar", "DELETE").is_none());
    }

    #[test]
    fn test_group_prefix_and_url() {
        let mut registry = rewrite();
        registry.prefix("baz").group(|r| {
            r.get("foo", ok).unwrap().name("foo");
        });
        assert_eq!(registry.find_by_name("foo").unwrap().path(), "baz/foo");
        assert_eq!(
            registry.route_url("foo", Vec::<(&str, &str)>::new()).as_deref(),
            Some("http://testsite.local/baz/foo")
        );
    }

    #[test]
    fn test_url_substitutes_path_variables() {
        let mut registry = rewrite();
        registry.get("users/{id}", ok).unwrap().name("user");
        assert_eq!(
            registry.route_url("user", [("id", "12")]).as_deref(),
            Some("http://testsite.local/users/12")
        );
        assert_eq!(registry.route_url("missing", [("id", "12")]), None);
    }

    #[test]
    fn test_explicit_open_close() {
        let mut registry = rewrite();
        let outer = registry.open_group();
        registry.group_mut(outer).prefix = "a".to_string();
        registry.get("x", ok);
        assert_eq!(registry.close_group().unwrap(), outer);
        registry.get("y", ok);

        let paths: Vec<String> = registry.routes().map(|r| r.path()).collect();
        assert_eq!(paths, vec!["a/x", "y"]);
        assert!(matches!(registry.close_group(), Err(RoutingError::GroupStackEmpty)));
    }

    #[test]
    fn test_group_scope_closes_groups_left_open() {
        let mut registry = rewrite();
        registry.prefix("outer").group(|r| {
            let leaked = r.open_group();
            r.group_mut(leaked).prefix = "leaked".to_string();
            r.get("inside", ok);
        });
        assert_eq!(registry.current_group(), None);

        registry.get("after", ok);
        let paths: Vec<String> = registry.routes().map(|r| r.path()).collect();
        assert_eq!(paths, vec!["outer/leaked/inside", "after"]);
    }

    #[test]
    fn test_position_defaults_and_override() {
        let mut registry = rewrite();
        registry.get("top", ok);
        registry.get("bottom", ok).unwrap().position(Position::Bottom);
        assert_eq!(registry.routes().next().unwrap().position(), Position::Top);
        assert_eq!(registry.find_by_path_and_method("bottom", "GET").unwrap().position(), Position::Bottom);
    }

    #[test]
    fn test_fingerprint_tracks_changes() {
        let mut registry = rewrite();
        registry.get("a", ok);
        let first = registry.fingerprint();
        assert_eq!(first, registry.fingerprint());

        registry.get("a", ok).unwrap().position(Position::Bottom);
        assert_ne!(first, registry.fingerprint());
    }

    #[test]
    fn test_compile_skips_duplicate_params_across_prefix() {
        let mut registry = rewrite();
        registry.prefix("users/{id}").group(|r| {
            r.get("posts/{id}", ok);
            r.get("posts", ok);
        });
        let table = registry.compile(&MiddlewareRegistry::new()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.iter().next().unwrap().path(), "users/{id}/posts");
    }

    #[test]
    fn test_strict_methods_fail_compile() {
        let mut registry = RouteRegistry::new(Flavor::Rewrite, RouterConfig::default().strict());
        registry.get("fine", ok);
        registry.match_methods(&["BREW"], "coffee", ok);
        let err = registry.compile(&MiddlewareRegistry::new()).unwrap_err();
        assert_eq!(err.error_code(), "NO_ALLOWED_METHODS");
    }

    #[test]
    fn test_rest_metadata_inheritance() {
        let mut registry = RouteRegistry::new(Flavor::Rest, RouterConfig::default());
        registry.namespace("shop/v2").public(true).group(|r| {
            r.prefix("items").group(|r| {
                r.get("{id}", ok).unwrap().name("item");
            });
        });
        registry.get("private", ok).unwrap().name("private");

        let item = registry.find_by_name("item").unwrap();
        assert_eq!(item.namespace(), "shop/v2");
        assert!(item.is_public());
        assert!(matches!(item.permission(), crate::host::PermissionCheck::AllowAll));
        assert_eq!(item.handle(), "item");
        assert_eq!(
            item.url([("id", "5")]),
            "http://localhost/wp-json/shop/v2/items/5"
        );

        let private = registry.find_by_name("private").unwrap();
        assert_eq!(private.namespace(), "mtwp/v1");
        assert!(matches!(private.permission(), crate::host::PermissionCheck::DenyAll));
    }
}
