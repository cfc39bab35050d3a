//! Handlers for the heatmap, trend, growth, and report views.
//!
//! List-valued params (`metrics`, `branches`) are comma-separated. Dates
//! accept any form the date normaliser does; an unparseable date is a 400.
//! Everything else is lenient: a trend with no usable mode is an empty
//! series response.

use axum::{
  Json,
  extract::{Query, State},
  http::header,
  response::IntoResponse,
};
use serde::Deserialize;
use trendhub_core::store::{FactStore, MetricRegistry};
use trendhub_engine::{GrowthRequest, Heatmap, SeriesResponse, TrendRequest};

use crate::{AppState, error::ApiError, parse_date, split_csv};

pub const REPORT_DISPOSITION: &str = "attachment; filename=loan_report.json";

// ─── Heatmap ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SnapshotParams {
  pub scope:   String,
  pub date:    String,
  pub metrics: String,
}

/// `GET /api/heatmap?scope=&date=&metrics=`
pub async fn heatmap<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<SnapshotParams>,
) -> Result<Json<Heatmap>, ApiError>
where
  S: FactStore + MetricRegistry,
{
  let date = parse_date("date", &params.date)?;
  let metrics = split_csv(Some(&params.metrics));
  Ok(Json(state.engine().heatmap(&params.scope, date, metrics).await?))
}

/// `GET /api/report/export?scope=&date=&metrics=`
pub async fn export<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<SnapshotParams>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FactStore + MetricRegistry,
{
  let date = parse_date("date", &params.date)?;
  let metrics = split_csv(Some(&params.metrics));
  let report = state.engine().export_report(&params.scope, date, metrics).await?;
  Ok(([(header::CONTENT_DISPOSITION, REPORT_DISPOSITION)], Json(report)))
}

// ─── Trend ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TrendParams {
  pub scope:    String,
  pub metric:   Option<String>,
  pub branches: Option<String>,
  pub branch:   Option<String>,
  pub metrics:  Option<String>,
  pub start:    String,
  pub end:      String,
}

/// `GET /api/trend/multi?scope=&start=&end=[&metric=&branches=][&branch=&metrics=]`
pub async fn multi_trend<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<TrendParams>,
) -> Result<Json<SeriesResponse>, ApiError>
where
  S: FactStore + MetricRegistry,
{
  let req = TrendRequest {
    start:    parse_date("start", &params.start)?,
    end:      parse_date("end", &params.end)?,
    branches: split_csv(params.branches.as_deref()),
    metrics:  split_csv(params.metrics.as_deref()),
    scope:    params.scope,
    metric:   params.metric,
    branch:   params.branch,
  };
  Ok(Json(state.engine().multi_trend(&req).await?))
}

// ─── Growth ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct GrowthParams {
  pub scope:        String,
  pub delta_metric: String,
  pub base_metric:  String,
  pub branches:     Option<String>,
  pub start:        String,
  pub end:          String,
}

/// `GET /api/growth?scope=&delta_metric=&base_metric=&branches=&start=&end=`
pub async fn growth<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<GrowthParams>,
) -> Result<Json<SeriesResponse>, ApiError>
where
  S: FactStore + MetricRegistry,
{
  let req = GrowthRequest {
    start:        parse_date("start", &params.start)?,
    end:          parse_date("end", &params.end)?,
    branches:     split_csv(params.branches.as_deref()),
    scope:        params.scope,
    delta_metric: params.delta_metric,
    base_metric:  params.base_metric,
  };
  Ok(Json(state.engine().growth_series(&req).await?))
}
