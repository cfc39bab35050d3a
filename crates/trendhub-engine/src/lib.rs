//! Ingestion and aggregation over any [`trendhub_core::store::FactStore`].
//!
//! - [`ingest`] turns a batch of uploaded report files into one keyed upsert.
//! - [`AggregationEngine`] answers heatmap, multi-series trend, growth, and
//!   report-export queries.
//!
//! Both are stateless: every call reads what it needs from the store handles
//! it is given.

pub mod error;
pub mod ingest;
pub mod query;

pub use error::{Error, IngestFailure, Result};
pub use ingest::{IngestSummary, UploadedFile, ingest};
pub use query::{
  AggregationEngine, GrowthRequest, HeatCell, Heatmap, Report, ScopeEntry,
  Series, SeriesResponse, TrendRequest,
};

#[cfg(test)]
mod tests;
