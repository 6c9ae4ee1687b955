//! JSON document storage implementation for Ingot.
//!
//! This crate provides all file-backed persistence using whole-document JSON
//! blobs. It implements the repository traits defined in `ingot-core` and
//! contains:
//! - The keyed document store with atomic full-blob writes
//! - The local holdings repository
//! - The pending-action queue repository
//!
//! # Architecture
//!
//! This crate is the only place in the application that touches the
//! filesystem. All other crates (`core`, `remote-api`) are storage-agnostic
//! and work with traits.
//!
//! ```text
//! core (domain + sync)
//!          │
//!          ▼
//! storage-json (this crate)
//!          │
//!          ▼
//!   <dir>/<key>.json
//! ```

pub mod document;
pub mod errors;

// Repository implementations
pub mod holdings;
pub mod pending;

// Re-export store utilities
pub use document::{JsonDocumentStore, HOLDINGS_DOCUMENT_KEY, PENDING_ACTIONS_DOCUMENT_KEY};

// Re-export conversion helpers
pub use errors::IntoCore;

// Re-export from ingot-core for convenience
pub use ingot_core::errors::{Error, Result, StorageError};
