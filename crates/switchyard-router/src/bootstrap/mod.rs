//! Startup wiring
//!
//! Route definitions are collected by a [`DefinitionLoader`], declared into
//! a [`RouteSet`] exactly once, and registered with the host by the
//! [`RouteService`], which then serves requests from the compiled tables.

mod definitions;
mod service;

pub use definitions::{DefinitionLoader, RouteDefinitions, RouteSet};
pub use service::{RegistrationReport, RouteService};
