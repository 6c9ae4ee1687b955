//! JSON document storage implementation for the local holdings collection.

mod repository;

pub use repository::JsonHoldingsRepository;
