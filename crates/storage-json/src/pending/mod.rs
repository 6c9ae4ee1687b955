//! JSON document storage implementation for the pending-action queue.

mod repository;

pub use repository::JsonPendingActionRepository;
