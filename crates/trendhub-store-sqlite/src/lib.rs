//! SQLite backend for the loan trend store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Implements both
//! [`trendhub_core::store::FactStore`] and
//! [`trendhub_core::store::MetricRegistry`].

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
