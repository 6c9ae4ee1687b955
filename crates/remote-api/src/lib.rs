//! Ingot Remote API - HTTP client for the hosted holdings service.
//!
//! This crate provides the API client, wire types, and the
//! `RemoteHoldingsRepositoryTrait` implementation used by the sync
//! coordinator when the user is signed in. It owns the defensive decoding
//! of records written by foreign clients; nothing upstream re-inspects raw
//! wire text.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ingot_remote_api::{ApiHoldingsRepository, HoldingsApiClient};
//!
//! let client = HoldingsApiClient::new("https://api.ingot.app")
//!     .with_access_token("access_token");
//! let repository = ApiHoldingsRepository::new(client);
//! let holdings = repository.fetch("user-1").await?;
//! ```

mod client;
mod decode;
mod error;
mod repository;
mod types;

pub use client::HoldingsApiClient;
pub use error::{RemoteApiError, Result};
pub use repository::ApiHoldingsRepository;
pub use types::*;
