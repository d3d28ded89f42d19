use crate::config::RouterConfig;
use crate::routing::{Flavor, RouteRegistry};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One registry per flavor, sharing a configuration
#[derive(Debug)]
pub struct RouteSet {
    pub rewrite: RouteRegistry,
    pub rest: RouteRegistry,
}

impl RouteSet {
    pub fn new(config: Arc<RouterConfig>) -> Self {
        Self {
            rewrite: RouteRegistry::with_shared_config(Flavor::Rewrite, Arc::clone(&config)),
            rest: RouteRegistry::with_shared_config(Flavor::Rest, config),
        }
    }

    pub fn registry(&self, flavor: Flavor) -> &RouteRegistry {
        match flavor {
            Flavor::Rewrite => &self.rewrite,
            Flavor::Rest => &self.rest,
        }
    }

    pub fn registry_mut(&mut self, flavor: Flavor) -> &mut RouteRegistry {
        match flavor {
            Flavor::Rewrite => &mut self.rewrite,
            Flavor::Rest => &mut self.rest,
        }
    }

    pub fn len(&self) -> usize {
        self.rewrite.len() + self.rest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A unit of route declaration code
pub trait RouteDefinitions: Send + Sync {
    fn name(&self) -> &str {
        "routes"
    }

    fn define(&self, routes: &mut RouteSet);
}

impl<F> RouteDefinitions for F
where
    F: Fn(&mut RouteSet) + Send + Sync,
{
    fn define(&self, routes: &mut RouteSet) {
        self(routes)
    }
}

/// Runs every definition once, in the order they were added
#[derive(Default)]
pub struct DefinitionLoader {
    definitions: Vec<Arc<dyn RouteDefinitions>>,
    loaded: AtomicBool,
}

impl DefinitionLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<D: RouteDefinitions + 'static>(&mut self, definitions: D) -> &mut Self {
        self.definitions.push(Arc::new(definitions));
        self
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::Acquire)
    }

    /// Declare every definition into `routes`.
    ///
    /// Returns `false` without running anything when already loaded.
    pub fn load(&self, routes: &mut RouteSet) -> bool {
        if self.loaded.swap(true, Ordering::AcqRel) {
            tracing::debug!(target: "switchyard::bootstrap", "Definitions already loaded");
            return false;
        }
        self.run(routes);
        true
    }

    /// Declare every definition again, into a fresh set
    pub fn reload(&self, routes: &mut RouteSet) {
        self.loaded.store(true, Ordering::Release);
        self.run(routes);
    }

    fn run(&self, routes: &mut RouteSet) {
        for definitions in &self.definitions {
            let before = routes.len();
            definitions.define(routes);
            tracing::debug!(
                target: "switchyard::bootstrap",
                definitions = definitions.name(),
                declared = routes.len().saturating_sub(before),
                "Route definitions loaded"
            );
        }
    }
}

impl std::fmt::Debug for DefinitionLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.definitions.iter().map(|d| d.name()).collect();
        f.debug_struct("DefinitionLoader")
            .field("definitions", &names)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
