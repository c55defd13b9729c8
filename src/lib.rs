//! Contract-driven support ticketing.
//!
//! Every ticket lives under a contract that defines which demand
//! triples (demand type, severity, software criticality) and which
//! software versions it covers. The crate validates mutations against
//! that contract, tracks SLA clocks across state transitions, and feeds
//! an activity timeline through a typed event bus. An optional axum
//! surface (feature `api`, on by default) exposes the whole thing over
//! HTTP.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ticketing::events::EventBus;
//! use ticketing::service::TicketingService;
//! use ticketing::storage::FileStorage;
//!
//! let storage = Arc::new(FileStorage::new(".ticketing"));
//! storage.ensure_directories()?;
//! let service = TicketingService::new(storage, EventBus::default());
//! ```

// Allow missing error documentation for internal implementations
#![allow(clippy::missing_errors_doc)]

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod events;
pub mod service;
pub mod storage;
pub mod validation;

#[cfg(feature = "api")]
pub mod api;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types
pub use error::{Result, TicketingError};
