//! Ingot Core - Domain entities, services, and traits.
//!
//! This crate contains the core business logic for Ingot: holding models
//! with canonical weight conversion, the CSV interchange format, and the
//! sync coordinator. It is storage- and transport-agnostic and defines
//! traits that are implemented by the `storage-json` and `remote-api`
//! crates.

pub mod errors;
pub mod events;
pub mod holdings;
pub mod sync;

// Re-export common types from the holdings and sync modules
pub use holdings::*;
pub use sync::*;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
