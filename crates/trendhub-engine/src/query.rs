//! [`AggregationEngine`]: read-only views over stored facts.
//!
//! Every view builds its axes as explicitly ordered vectors and resolves
//! values through lookup maps filled in one pass over the fetched facts.
//! Malformed requests (no usable mode, empty lists, inverted windows) yield
//! defined empty responses rather than errors.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;
use trendhub_core::{
  Fact, MetricDef, MetricMeta, Scope,
  metric::index_by_code,
  scope,
  store::{DateBounds, FactStore, MetricRegistry, Period},
};

use crate::error::{Error, Result};

/// Denominators smaller than this make a growth ratio undefined.
pub const GROWTH_EPSILON: f64 = 1e-9;

pub const REPORT_TITLE: &str = "贷款多视角日报分析";

// ─── Response types ──────────────────────────────────────────────────────────

/// A scope code paired with its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeEntry {
  pub key:  Scope,
  pub name: &'static str,
}

/// A `[column, row, value]` heatmap cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatCell(pub usize, pub usize, pub f64);

/// Branch × metric cross-section on one business date.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Heatmap {
  pub date:        NaiveDate,
  pub scope:       Scope,
  /// Column axis, in request order.
  pub metrics:     Vec<String>,
  /// Row axis: every branch known under `scope`.
  pub branches:    Vec<String>,
  pub min:         f64,
  pub max:         f64,
  /// Sparse: pairs with no stored value are absent, never zero-filled.
  #[serde(rename = "data")]
  pub cells:       Vec<HeatCell>,
  pub metric_defs: BTreeMap<String, MetricMeta>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
  pub name:   String,
  /// One slot per date of the enclosing response; `None` where no fact exists.
  #[serde(rename = "y")]
  pub values: Vec<Option<f64>>,
}

/// Named series sharing one date axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesResponse {
  pub title:  String,
  pub unit:   String,
  #[serde(rename = "x")]
  pub dates:  Vec<NaiveDate>,
  pub series: Vec<Series>,
}

impl SeriesResponse {
  fn empty(title: String, unit: &str) -> Self {
    Self { title, unit: unit.to_owned(), dates: vec![], series: vec![] }
  }
}

/// Exportable snapshot of a heatmap.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
  pub title:        String,
  pub date:         NaiveDate,
  pub scope:        Scope,
  pub metrics:      Vec<String>,
  pub branches:     Vec<String>,
  pub heatmap_data: Vec<HeatCell>,
  pub min:          f64,
  pub max:          f64,
}

// ─── Requests ────────────────────────────────────────────────────────────────

/// Parameters of a multi-series trend.
///
/// Exactly one mode applies: `metric` with `branches` plots one metric across
/// branches; otherwise `branch` with `metrics` plots several metrics for one
/// branch. With neither, the response is empty.
#[derive(Debug, Clone)]
pub struct TrendRequest {
  pub scope:    String,
  pub metric:   Option<String>,
  pub branches: Vec<String>,
  pub branch:   Option<String>,
  pub metrics:  Vec<String>,
  pub start:    NaiveDate,
  pub end:      NaiveDate,
}

enum TrendMode<'r> {
  ByBranches { metric: &'r str, branches: &'r [String] },
  ByMetrics { branch: &'r str, metrics: &'r [String] },
}

impl TrendRequest {
  fn mode(&self) -> Option<TrendMode<'_>> {
    if let Some(metric) = present(&self.metric)
      && !self.branches.is_empty()
    {
      return Some(TrendMode::ByBranches { metric, branches: &self.branches });
    }
    if let Some(branch) = present(&self.branch)
      && !self.metrics.is_empty()
    {
      return Some(TrendMode::ByMetrics { branch, metrics: &self.metrics });
    }
    None
  }
}

/// Parameters of a period-lag growth series.
#[derive(Debug, Clone)]
pub struct GrowthRequest {
  pub scope:        String,
  pub delta_metric: String,
  pub base_metric:  String,
  pub branches:     Vec<String>,
  pub start:        NaiveDate,
  pub end:          NaiveDate,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Read-only query layer over a fact store and a metric registry.
///
/// Holds borrowed handles only; construct one per request.
pub struct AggregationEngine<'s, F, M> {
  facts:   &'s F,
  metrics: &'s M,
}

impl<'s, F, M> AggregationEngine<'s, F, M>
where
  F: FactStore,
  M: MetricRegistry,
{
  pub fn new(facts: &'s F, metrics: &'s M) -> Self { Self { facts, metrics } }

  // ── Listings ────────────────────────────────────────────────────────────

  pub async fn scopes(&self) -> Result<Vec<ScopeEntry>> {
    let scopes = self.facts.distinct_scopes().await.map_err(Error::store)?;
    Ok(
      scopes
        .into_iter()
        .map(|key| ScopeEntry { key, name: key.display_name() })
        .collect(),
    )
  }

  pub async fn branches(&self, scope: &str) -> Result<Vec<String>> {
    self
      .facts
      .distinct_branches(scope::normalize(scope))
      .await
      .map_err(Error::store)
  }

  pub async fn metrics(&self) -> Result<Vec<MetricDef>> {
    self.metrics.list_metrics().await.map_err(Error::store)
  }

  pub async fn date_range(&self) -> Result<Option<DateBounds>> {
    self.facts.date_bounds().await.map_err(Error::store)
  }

  async fn metric_defs(&self) -> Result<BTreeMap<String, MetricDef>> {
    Ok(index_by_code(self.metrics().await?))
  }

  // ── Heatmap ─────────────────────────────────────────────────────────────

  pub async fn heatmap(&self, scope: &str, date: NaiveDate, metrics: Vec<String>) -> Result<Heatmap> {
    let scope = scope::normalize(scope);
    let branches = self.facts.distinct_branches(scope).await.map_err(Error::store)?;
    let facts = self
      .facts
      .facts_by_date_scope_metrics(date, scope, &metrics)
      .await
      .map_err(Error::store)?;
    let defs = self.metric_defs().await?;

    let column_of: HashMap<&str, usize> =
      metrics.iter().enumerate().map(|(i, m)| (m.as_str(), i)).collect();
    let row_of: HashMap<&str, usize> =
      branches.iter().enumerate().map(|(i, b)| (b.as_str(), i)).collect();

    let mut cells = Vec::new();
    let mut bounds: Option<(f64, f64)> = None;
    for fact in &facts {
      let (Some(&col), Some(&row), Some(value)) = (
        column_of.get(fact.metric.as_str()),
        row_of.get(fact.branch.as_str()),
        fact.value,
      ) else {
        continue;
      };
      cells.push(HeatCell(col, row, value));
      bounds = Some(match bounds {
        Some((lo, hi)) => (lo.min(value), hi.max(value)),
        None => (value, value),
      });
    }
    let (min, max) = bounds.unwrap_or((0.0, 1.0));

    let metric_defs = metrics
      .iter()
      .map(|m| (m.clone(), MetricMeta::lookup(&defs, m)))
      .collect();

    Ok(Heatmap { date, scope, metrics, branches, min, max, cells, metric_defs })
  }

  // ── Trends ──────────────────────────────────────────────────────────────

  pub async fn multi_trend(&self, req: &TrendRequest) -> Result<SeriesResponse> {
    let scope = scope::normalize(&req.scope);
    let (Some(mode), Some(period)) = (req.mode(), window(req.start, req.end)) else {
      return Ok(SeriesResponse::empty(format!("趋势：{scope}"), ""));
    };

    let dates = self.facts.distinct_dates(scope, period).await.map_err(Error::store)?;
    let defs = self.metric_defs().await?;

    match mode {
      TrendMode::ByBranches { metric, branches } => {
        let facts = self
          .facts
          .facts_by_scope_metric_branches(scope, metric, branches, period)
          .await
          .map_err(Error::store)?;
        let lookup = index_values(&facts, |f| &f.branch);
        let series = branches
          .iter()
          .map(|b| Series { name: b.clone(), values: aligned(&dates, &lookup, b) })
          .collect();
        let meta = MetricMeta::lookup(&defs, metric);

        Ok(SeriesResponse {
          title: format!("趋势：{scope} / {}", meta.name),
          unit: meta.unit,
          dates,
          series,
        })
      }
      TrendMode::ByMetrics { branch, metrics } => {
        let facts = self
          .facts
          .facts_by_scope_branch_metrics(scope, branch, metrics, period)
          .await
          .map_err(Error::store)?;
        let lookup = index_values(&facts, |f| &f.metric);
        let metas: Vec<MetricMeta> = metrics.iter().map(|m| MetricMeta::lookup(&defs, m)).collect();
        let series = metrics
          .iter()
          .zip(&metas)
          .map(|(m, meta)| Series { name: meta.name.clone(), values: aligned(&dates, &lookup, m) })
          .collect();

        // A unit only labels the axis when every plotted metric shares it.
        let unit = match metas.split_first() {
          Some((first, rest)) if rest.iter().all(|m| m.unit == first.unit) => first.unit.clone(),
          _ => String::new(),
        };

        Ok(SeriesResponse {
          title: format!("趋势：{scope} / {branch}"),
          unit,
          dates,
          series,
        })
      }
    }
  }

  /// `growth[i] = delta(date[i]) / base(date[i-1]) × 100` per branch.
  ///
  /// The base is read one step back on the shared axis, which may skip
  /// calendar days. Index 0 has no prior period; a missing operand or a base
  /// within [`GROWTH_EPSILON`] of zero also yields `None`.
  pub async fn growth_series(&self, req: &GrowthRequest) -> Result<SeriesResponse> {
    let scope = scope::normalize(&req.scope);
    let Some(period) = window(req.start, req.end) else {
      return Ok(SeriesResponse::empty(format!("增长率：{scope}"), "%"));
    };

    let dates = self.facts.distinct_dates(scope, period).await.map_err(Error::store)?;
    if dates.is_empty() {
      return Ok(SeriesResponse::empty(format!("增长率：{scope}"), "%"));
    }

    let delta_facts = self
      .facts
      .facts_by_scope_metric_branches(scope, &req.delta_metric, &req.branches, period)
      .await
      .map_err(Error::store)?;
    let base_facts = self
      .facts
      .facts_by_scope_metric_branches(scope, &req.base_metric, &req.branches, period)
      .await
      .map_err(Error::store)?;
    let defs = self.metric_defs().await?;

    let delta = index_values(&delta_facts, |f| &f.branch);
    let base = index_values(&base_facts, |f| &f.branch);

    let series = req
      .branches
      .iter()
      .map(|b| {
        let values = std::iter::once(None)
          .chain(dates.windows(2).map(|pair| {
            let d = delta.get(&(b.as_str(), pair[1]))?;
            let prev = base.get(&(b.as_str(), pair[0]))?;
            (prev.abs() >= GROWTH_EPSILON).then(|| d / prev * 100.0)
          }))
          .collect();
        Series { name: b.clone(), values }
      })
      .collect();

    let delta_name = MetricMeta::lookup(&defs, &req.delta_metric).name;
    let base_name = MetricMeta::lookup(&defs, &req.base_metric).name;

    Ok(SeriesResponse {
      title: format!("增长率：{scope}（{delta_name} ÷ 上期{base_name}）"),
      unit: "%".to_owned(),
      dates,
      series,
    })
  }

  // ── Export ──────────────────────────────────────────────────────────────

  pub async fn export_report(&self, scope: &str, date: NaiveDate, metrics: Vec<String>) -> Result<Report> {
    let heatmap = self.heatmap(scope, date, metrics).await?;
    Ok(Report {
      title:        REPORT_TITLE.to_owned(),
      date:         heatmap.date,
      scope:        heatmap.scope,
      metrics:      heatmap.metrics,
      branches:     heatmap.branches,
      heatmap_data: heatmap.cells,
      min:          heatmap.min,
      max:          heatmap.max,
    })
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn present(s: &Option<String>) -> Option<&str> {
  s.as_deref().filter(|s| !s.trim().is_empty())
}

/// `None` for an inverted window.
fn window(start: NaiveDate, end: NaiveDate) -> Option<Period> { Period::new(start, end).ok() }

type ValueIndex<'f> = HashMap<(&'f str, NaiveDate), f64>;

/// Index valued facts by `(series key, date)`.
fn index_values<'f>(facts: &'f [Fact], key: impl Fn(&'f Fact) -> &'f String) -> ValueIndex<'f> {
  facts
    .iter()
    .filter_map(|f| f.value.map(|v| ((key(f).as_str(), f.date), v)))
    .collect()
}

fn aligned(dates: &[NaiveDate], lookup: &ValueIndex<'_>, key: &str) -> Vec<Option<f64>> {
  dates.iter().map(|d| lookup.get(&(key, *d)).copied()).collect()
}
