//! # switchyard-testing
//!
//! Test doubles for the host collaborators of `switchyard-router`:
//! - Recording rewrite facility and endpoint publisher
//! - Counting, short-circuiting, failing and order-probing middleware
//! - A counting route handler
//! - A fluent [`TestRequest`] builder
//! - Panicking assertions over dispatch outcomes

pub mod assertions;
pub mod host;
pub mod middleware;
pub mod request;

pub use assertions::OutcomeAssertions;
pub use host::{RecordingEndpointPublisher, RecordingRewriteFacility};
pub use middleware::{
    CountingHandler, CountingMiddleware, FailingMiddleware, OrderRecorder, ShortCircuitMiddleware,
};
pub use request::TestRequest;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CountingHandler, CountingMiddleware, FailingMiddleware, OrderRecorder, OutcomeAssertions,
        RecordingEndpointPublisher, RecordingRewriteFacility, ShortCircuitMiddleware, TestRequest,
    };

    pub use serde_json::{json, Value as JsonValue};
    pub use switchyard_router::prelude::*;
}
