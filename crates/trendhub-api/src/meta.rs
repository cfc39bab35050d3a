//! Axis listings: scopes, branches, metrics, and the stored date range.

use axum::{
  Json,
  extract::{Query, State},
};
use serde::Deserialize;
use trendhub_core::{
  MetricDef,
  store::{DateBounds, FactStore, MetricRegistry},
};
use trendhub_engine::ScopeEntry;

use crate::{AppState, error::ApiError};

/// `GET /api/scopes`
pub async fn scopes<S>(State(state): State<AppState<S>>) -> Result<Json<Vec<ScopeEntry>>, ApiError>
where
  S: FactStore + MetricRegistry,
{
  Ok(Json(state.engine().scopes().await?))
}

#[derive(Debug, Deserialize)]
pub struct BranchParams {
  pub scope: String,
}

/// `GET /api/branches?scope=<scope>`
pub async fn branches<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<BranchParams>,
) -> Result<Json<Vec<String>>, ApiError>
where
  S: FactStore + MetricRegistry,
{
  Ok(Json(state.engine().branches(&params.scope).await?))
}

/// `GET /api/metrics`
pub async fn metrics<S>(State(state): State<AppState<S>>) -> Result<Json<Vec<MetricDef>>, ApiError>
where
  S: FactStore + MetricRegistry,
{
  Ok(Json(state.engine().metrics().await?))
}

/// `GET /api/date-range`
pub async fn date_range<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Option<DateBounds>>, ApiError>
where
  S: FactStore + MetricRegistry,
{
  Ok(Json(state.engine().date_range().await?))
}
