//! The `FactStore` and `MetricRegistry` traits and supporting query types.
//!
//! Both traits are implemented by storage backends (e.g.
//! `trendhub-store-sqlite`). The ingestion and aggregation layers depend on
//! these abstractions, not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Fact, MetricDef, Result, Scope};

// ─── Query types ─────────────────────────────────────────────────────────────

/// An inclusive business-date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
  pub start: NaiveDate,
  pub end:   NaiveDate,
}

impl Period {
  pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
    if start > end {
      return Err(Error::InvertedPeriod { start, end });
    }
    Ok(Self { start, end })
  }
}

/// The earliest and latest business dates held by a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateBounds {
  pub min: NaiveDate,
  pub max: NaiveDate,
}

// ─── Traits ──────────────────────────────────────────────────────────────────

/// Keyed storage of [`Fact`] records.
///
/// Writes are upserts on the natural key `(date, scope, branch, metric)`:
/// the last write wins for `value` and `source_file`. Readers must observe
/// either the pre- or post-upsert state of a key, never a mix.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait FactStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Writes ────────────────────────────────────────────────────────────

  /// Upsert every fact in one transaction and return the number of stored
  /// rows written.
  fn upsert_batch(
    &self,
    facts: Vec<Fact>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Axis listings ─────────────────────────────────────────────────────

  /// Every scope with at least one fact, ascending.
  fn distinct_scopes(
    &self,
  ) -> impl Future<Output = Result<Vec<Scope>, Self::Error>> + Send + '_;

  /// Every branch with at least one fact under `scope`, ascending.
  fn distinct_branches(
    &self,
    scope: Scope,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Every business date under `scope` inside `period`, ascending.
  fn distinct_dates(
    &self,
    scope: Scope,
    period: Period,
  ) -> impl Future<Output = Result<Vec<NaiveDate>, Self::Error>> + Send + '_;

  /// Min/max business date over the whole store; `None` when empty.
  fn date_bounds(
    &self,
  ) -> impl Future<Output = Result<Option<DateBounds>, Self::Error>> + Send + '_;

  // ── Fact reads ────────────────────────────────────────────────────────

  /// Cross-section: all facts on `date` under `scope` for any of `metrics`.
  fn facts_by_date_scope_metrics<'a>(
    &'a self,
    date: NaiveDate,
    scope: Scope,
    metrics: &'a [String],
  ) -> impl Future<Output = Result<Vec<Fact>, Self::Error>> + Send + 'a;

  /// One metric across several branches over `period`.
  fn facts_by_scope_metric_branches<'a>(
    &'a self,
    scope: Scope,
    metric: &'a str,
    branches: &'a [String],
    period: Period,
  ) -> impl Future<Output = Result<Vec<Fact>, Self::Error>> + Send + 'a;

  /// Several metrics for one branch over `period`.
  fn facts_by_scope_branch_metrics<'a>(
    &'a self,
    scope: Scope,
    branch: &'a str,
    metrics: &'a [String],
    period: Period,
  ) -> impl Future<Output = Result<Vec<Fact>, Self::Error>> + Send + 'a;
}

/// Read-only source of [`MetricDef`] metadata.
pub trait MetricRegistry: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// All known metric definitions, ordered by code.
  fn list_metrics(
    &self,
  ) -> impl Future<Output = Result<Vec<MetricDef>, Self::Error>> + Send + '_;
}
