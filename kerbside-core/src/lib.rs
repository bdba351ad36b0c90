//! Core types and service wiring for the kerbside waste collection tracker.

/// Pulls collection lines out of schedule markup.
pub mod extractor;
/// Domain models and identifiers.
pub mod model;
/// Provider bundle handed to the service.
pub mod plugin;
/// Periodic refresh and publication of results.
pub mod poller;
/// Traits describing the provider interfaces.
pub mod ports;
/// Year inference for partial dates.
pub mod resolver;
/// High-level service facade used by clients.
pub mod service;
/// Derived attributes computed when a result is read.
pub mod view;

pub use extractor::*;
pub use model::*;
pub use plugin::*;
pub use poller::*;
pub use ports::*;
pub use resolver::*;
pub use service::*;
pub use view::*;
