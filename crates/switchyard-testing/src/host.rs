//! Recording host facilities
//!
//! Both doubles keep every call they receive so tests can assert on exactly
//! what registration handed to the host.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use switchyard_router::host::{Endpoint, EndpointPublisher, RewriteFacility, RewriteRule};

/// Rewrite facility that records query variables, rules and flushes
#[derive(Debug, Default)]
pub struct RecordingRewriteFacility {
    query_vars: Mutex<Vec<(String, String)>>,
    rules: Mutex<Vec<RewriteRule>>,
    persisted: Mutex<Option<String>>,
    flushes: AtomicUsize,
}

impl RecordingRewriteFacility {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a fingerprint already persisted by an earlier process
    pub fn with_persisted(fingerprint: impl Into<String>) -> Self {
        let facility = Self::new();
        *facility.persisted.lock() = Some(fingerprint.into());
        facility
    }

    /// Registered query variable names, in call order
    pub fn query_vars(&self) -> Vec<String> {
        self.query_vars.lock().iter().map(|(name, _)| name.clone()).collect()
    }

    /// Capture expression registered for `name`
    pub fn capture_for(&self, name: &str) -> Option<String> {
        self.query_vars
            .lock()
            .iter()
            .find(|(registered, _)| registered == name)
            .map(|(_, capture)| capture.clone())
    }

    pub fn rules(&self) -> Vec<RewriteRule> {
        self.rules.lock().clone()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }

    pub fn persisted(&self) -> Option<String> {
        self.persisted.lock().clone()
    }

    /// Forget recorded variables and rules, keeping the persisted
    /// fingerprint and flush count
    pub fn clear_registrations(&self) {
        self.query_vars.lock().clear();
        self.rules.lock().clear();
    }
}

impl RewriteFacility for RecordingRewriteFacility {
    fn register_query_variable(&self, name: &str, capture: &str) {
        self.query_vars
            .lock()
            .push((name.to_string(), capture.to_string()));
    }

    fn register_pattern(&self, rule: &RewriteRule) {
        self.rules.lock().push(rule.clone());
    }

    fn persisted_fingerprint(&self) -> Option<String> {
        self.persisted()
    }

    fn persist_fingerprint(&self, fingerprint: &str) {
        *self.persisted.lock() = Some(fingerprint.to_string());
    }

    fn flush_rules(&self) {
        self.flushes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Endpoint publisher that keeps every published endpoint
#[derive(Debug, Default)]
pub struct RecordingEndpointPublisher {
    endpoints: Mutex<Vec<Endpoint>>,
}

impl RecordingEndpointPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.endpoints.lock().clone()
    }

    pub fn handles(&self) -> Vec<String> {
        self.endpoints
            .lock()
            .iter()
            .map(|endpoint| endpoint.handle.clone())
            .collect()
    }

    /// Endpoint published for `namespace` and full path `path`
    pub fn find(&self, namespace: &str, path: &str) -> Option<Endpoint> {
        self.endpoints
            .lock()
            .iter()
            .find(|endpoint| endpoint.namespace == namespace && endpoint.path == path)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.endpoints.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.lock().is_empty()
    }
}

impl EndpointPublisher for RecordingEndpointPublisher {
    fn publish(&self, endpoint: &Endpoint) {
        self.endpoints.lock().push(endpoint.clone());
    }
}
