//! Domain events module.
//!
//! Provides domain event types and the sink trait for emitting events after
//! successful domain mutations. Runtime adapters (desktop shell, web view
//! model) implement the sink to refresh their views without polling.

mod domain_event;
mod sink;

pub use domain_event::*;
pub use sink::*;
