//! JSON HTTP API for the loan trend hub.
//!
//! Exposes an axum [`Router`] backed by any store implementing both
//! [`FactStore`] and [`MetricRegistry`]. Auth and TLS are the caller's
//! responsibility.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/upload` | multipart, repeated `files` field |
//! | `GET`  | `/api/scopes` | |
//! | `GET`  | `/api/branches` | `?scope=` |
//! | `GET`  | `/api/metrics` | |
//! | `GET`  | `/api/date-range` | `null` when the store is empty |
//! | `GET`  | `/api/heatmap` | `?scope=&date=&metrics=a,b` |
//! | `GET`  | `/api/trend/multi` | `?scope=&start=&end=` plus `metric`+`branches` or `branch`+`metrics` |
//! | `GET`  | `/api/growth` | `?scope=&delta_metric=&base_metric=&branches=&start=&end=` |
//! | `GET`  | `/api/report/export` | `?scope=&date=&metrics=`, JSON attachment |

pub mod error;
pub mod meta;
pub mod query;
pub mod upload;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use trendhub_core::{
  date,
  store::{FactStore, MetricRegistry},
};
use trendhub_engine::AggregationEngine;

pub use error::ApiError;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TRENDHUB_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  pub store_path:       PathBuf,
  /// Request body cap for uploads, in bytes.
  pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:             "127.0.0.1".to_owned(),
      port:             8080,
      store_path:       PathBuf::from("trendhub.db"),
      max_upload_bytes: 32 * 1024 * 1024,
    }
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

impl<S> AppState<S>
where
  S: FactStore + MetricRegistry,
{
  pub(crate) fn engine(&self) -> AggregationEngine<'_, S, S> {
    AggregationEngine::new(&*self.store, &*self.store)
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: FactStore + MetricRegistry + Clone + Send + Sync + 'static,
{
  let body_limit = state.config.max_upload_bytes;

  Router::new()
    .route("/api/upload", post(upload::handler::<S>))
    // Axes
    .route("/api/scopes", get(meta::scopes::<S>))
    .route("/api/branches", get(meta::branches::<S>))
    .route("/api/metrics", get(meta::metrics::<S>))
    .route("/api/date-range", get(meta::date_range::<S>))
    // Views
    .route("/api/heatmap", get(query::heatmap::<S>))
    .route("/api/trend/multi", get(query::multi_trend::<S>))
    .route("/api/growth", get(query::growth::<S>))
    .route("/api/report/export", get(query::export::<S>))
    .layer(DefaultBodyLimit::max(body_limit))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Param helpers ───────────────────────────────────────────────────────────

/// Split a comma-separated list, trimming items and dropping blanks.
pub(crate) fn split_csv(s: Option<&str>) -> Vec<String> {
  s.map(|s| {
    s.split(',')
      .map(str::trim)
      .filter(|t| !t.is_empty())
      .map(str::to_owned)
      .collect()
  })
  .unwrap_or_default()
}

/// Parse a business date from a query parameter.
pub(crate) fn parse_date(name: &str, value: &str) -> Result<NaiveDate, ApiError> {
  date::normalize(value)
    .ok_or_else(|| ApiError::BadRequest(format!("{name}: not a date: {value:?}")))
}
