//! Core types and trait definitions for the loan trend hub.
//!
//! This crate is deliberately free of spreadsheet, HTTP, and database
//! dependencies. Every other crate depends on it.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod date;
pub mod error;
pub mod fact;
pub mod metric;
pub mod scope;
pub mod store;

pub use error::{Error, Result};
pub use fact::{Fact, FactKey};
pub use metric::{MetricDef, MetricKind, MetricMeta};
pub use scope::Scope;
