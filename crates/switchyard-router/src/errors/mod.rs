//! Error types for declaration, registration and dispatch.
//!
//! Declaration and registration problems surface as [`RoutingError`],
//! malformed path templates as [`PatternError`], and failures raised while a
//! request travels through a middleware chain (handler included) as
//! [`MiddlewareError`].

mod middleware_error;
mod routing_error;

pub use middleware_error::{MiddlewareError, MiddlewareResult};
pub use routing_error::{PatternError, RoutingError, RoutingResult};
