//! Named middleware resolution
//!
//! Groups may reference middleware by name, optionally with arguments:
//! `"auth:editor,admin"` resolves the `auth` factory with
//! `["editor", "admin"]`.

use super::{Middleware, MiddlewareChain};
use crate::errors::{RoutingError, RoutingResult};
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a middleware unit from its token arguments
pub type MiddlewareFactory = Arc<dyn Fn(&[String]) -> Arc<dyn Middleware> + Send + Sync>;

/// Group-level middleware reference
#[derive(Debug, Clone)]
pub enum MiddlewareEntry {
    /// `name` or `name:arg1,arg2`, resolved through a [`MiddlewareRegistry`]
    Named(String),
    /// Unit supplied directly
    Unit(Arc<dyn Middleware>),
}

impl MiddlewareEntry {
    /// Blank names carry no middleware and are filtered out
    pub fn is_empty(&self) -> bool {
        matches!(self, MiddlewareEntry::Named(name) if name.trim().is_empty())
    }

    pub fn label(&self) -> String {
        match self {
            MiddlewareEntry::Named(token) => token.clone(),
            MiddlewareEntry::Unit(unit) => unit.name().to_string(),
        }
    }
}

impl From<&str> for MiddlewareEntry {
    fn from(token: &str) -> Self {
        MiddlewareEntry::Named(token.to_string())
    }
}

impl From<String> for MiddlewareEntry {
    fn from(token: String) -> Self {
        MiddlewareEntry::Named(token)
    }
}

impl From<Arc<dyn Middleware>> for MiddlewareEntry {
    fn from(unit: Arc<dyn Middleware>) -> Self {
        MiddlewareEntry::Unit(unit)
    }
}

/// Split `name:a,b` into the name and its arguments
pub fn parse_token(token: &str) -> (&str, Vec<String>) {
    match token.split_once(':') {
        Some((name, args)) => (
            name.trim(),
            args.split(',').map(|arg| arg.trim().to_string()).collect(),
        ),
        None => (token.trim(), Vec::new()),
    }
}

/// Name to factory map used to resolve named middleware
#[derive(Clone, Default)]
pub struct MiddlewareRegistry {
    factories: HashMap<String, MiddlewareFactory>,
}

impl MiddlewareRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory receiving the token's arguments
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&[String]) -> Arc<dyn Middleware> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    /// Register a shared unit that ignores arguments
    pub fn register_unit(&mut self, name: impl Into<String>, unit: Arc<dyn Middleware>) -> &mut Self {
        self.register(name, move |_args| Arc::clone(&unit))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolve a `name[:args]` token
    pub fn resolve(&self, token: &str) -> Option<Arc<dyn Middleware>> {
        let (name, args) = parse_token(token);
        self.factories.get(name).map(|factory| factory(&args))
    }

    /// Resolve group entries into a chain, outermost first.
    ///
    /// Unknown names are dropped with a warning, or rejected when `strict`.
    pub fn resolve_entries(
        &self,
        entries: &[MiddlewareEntry],
        strict: bool,
    ) -> RoutingResult<MiddlewareChain> {
        let mut chain = MiddlewareChain::new();
        for entry in entries.iter().filter(|entry| !entry.is_empty()) {
            match entry {
                MiddlewareEntry::Unit(unit) => chain.append(Arc::clone(unit)),
                MiddlewareEntry::Named(token) => match self.resolve(token) {
                    Some(unit) => chain.append(unit),
                    None if strict => {
                        return Err(RoutingError::unresolved_middleware(parse_token(token).0));
                    }
                    None => {
                        tracing::warn!(
                            target: "switchyard::middleware",
                            middleware = token.as_str(),
                            "Unresolved middleware dropped from chain"
                        );
                    }
                },
            }
        }
        Ok(chain)
    }
}

impl std::fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiddlewareRegistry")
            .field("names", &self.names())
            .finish()
    }
}
