//! Aggregation tests against an in-memory `SqliteStore`.

use chrono::NaiveDate;
use trendhub_core::{
  Fact, Scope,
  metric::{BAL_TOTAL, CNT_TOTAL, DOD_BAL},
  store::FactStore,
};
use trendhub_store_sqlite::SqliteStore;

use crate::{AggregationEngine, GrowthRequest, HeatCell, TrendRequest};

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn fact(date: NaiveDate, scope: Scope, branch: &str, metric: &str, value: f64) -> Fact {
  Fact {
    date,
    scope,
    branch: branch.to_owned(),
    metric: metric.to_owned(),
    value: Some(value),
    source_file: "test.xlsx".to_owned(),
  }
}

fn strings(items: &[&str]) -> Vec<String> {
  items.iter().map(|s| (*s).to_owned()).collect()
}

async fn seeded(facts: Vec<Fact>) -> SqliteStore {
  let store = SqliteStore::open_in_memory().await.unwrap();
  store.upsert_batch(facts).await.unwrap();
  store
}

fn trend(scope: &str) -> TrendRequest {
  TrendRequest {
    scope:    scope.to_owned(),
    metric:   None,
    branches: vec![],
    branch:   None,
    metrics:  vec![],
    start:    ymd(2024, 1, 1),
    end:      ymd(2024, 1, 31),
  }
}

fn growth(branches: &[&str]) -> GrowthRequest {
  GrowthRequest {
    scope:        "PHY".to_owned(),
    delta_metric: DOD_BAL.to_owned(),
    base_metric:  BAL_TOTAL.to_owned(),
    branches:     strings(branches),
    start:        ymd(2024, 1, 1),
    end:          ymd(2024, 1, 31),
  }
}

// ─── Listings ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn scopes_carry_display_names() {
  let store = seeded(vec![
    fact(ymd(2024, 1, 5), Scope::Phy, "城东支行", BAL_TOTAL, 1.0),
    fact(ymd(2024, 1, 5), Scope::Adj, "城东支行", BAL_TOTAL, 1.0),
  ])
  .await;
  let engine = AggregationEngine::new(&store, &store);

  let scopes = engine.scopes().await.unwrap();
  assert_eq!(scopes.len(), 2);
  assert_eq!(scopes[0].key, Scope::Adj);
  assert_eq!(scopes[0].name, "实体贷款（还原剔转）");
  assert_eq!(scopes[1].name, "实体贷款（纯账面）");
}

#[tokio::test]
async fn branch_listing_normalizes_scope_alias() {
  let store = seeded(vec![fact(ymd(2024, 1, 5), Scope::Adj, "城东支行", BAL_TOTAL, 1.0)]).await;
  let engine = AggregationEngine::new(&store, &store);

  assert_eq!(engine.branches("还原剔转").await.unwrap(), strings(&["城东支行"]));
  assert!(engine.branches("纯账面").await.unwrap().is_empty());
}

#[tokio::test]
async fn date_range_is_none_when_empty() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let engine = AggregationEngine::new(&store, &store);
  assert!(engine.date_range().await.unwrap().is_none());
  assert_eq!(engine.metrics().await.unwrap().len(), 12);
}

// ─── Heatmap ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn heatmap_is_sparse_and_bounded() {
  let d = ymd(2024, 1, 5);
  let store = seeded(vec![
    fact(d, Scope::Phy, "城东支行", BAL_TOTAL, 1200.0),
    fact(d, Scope::Phy, "城东支行", CNT_TOTAL, 120.0),
    fact(d, Scope::Phy, "城西支行", BAL_TOTAL, -5.0),
    // Only known on another date: still a row, but no cell today.
    fact(ymd(2024, 1, 4), Scope::Phy, "城南支行", BAL_TOTAL, 50.0),
  ])
  .await;
  let engine = AggregationEngine::new(&store, &store);

  let hm = engine
    .heatmap("PHY", d, strings(&[BAL_TOTAL, CNT_TOTAL]))
    .await
    .unwrap();

  assert_eq!(hm.branches, strings(&["城东支行", "城南支行", "城西支行"]));
  assert_eq!(hm.cells.len(), 3);
  assert!(hm.cells.contains(&HeatCell(0, 0, 1200.0)));
  assert!(hm.cells.contains(&HeatCell(1, 0, 120.0)));
  assert!(hm.cells.contains(&HeatCell(0, 2, -5.0)));
  assert!(!hm.cells.iter().any(|c| c.1 == 1));

  assert_eq!((hm.min, hm.max), (-5.0, 1200.0));
  assert!(hm.cells.iter().all(|c| hm.min <= c.2 && c.2 <= hm.max));
  assert_eq!(hm.metric_defs[BAL_TOTAL].unit, "万元");
}

#[tokio::test]
async fn empty_heatmap_has_default_bounds() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let engine = AggregationEngine::new(&store, &store);

  let hm = engine
    .heatmap("PHY", ymd(2024, 1, 5), strings(&["NPL_RATIO"]))
    .await
    .unwrap();
  assert!(hm.cells.is_empty());
  assert_eq!((hm.min, hm.max), (0.0, 1.0));
  assert_eq!(hm.metric_defs["NPL_RATIO"].name, "NPL_RATIO");
}

#[tokio::test]
async fn heatmap_serializes_wire_names() {
  let d = ymd(2024, 1, 5);
  let store = seeded(vec![fact(d, Scope::Phy, "城东支行", BAL_TOTAL, 10.0)]).await;
  let engine = AggregationEngine::new(&store, &store);

  let hm = engine.heatmap("PHY", d, strings(&[BAL_TOTAL])).await.unwrap();
  let json = serde_json::to_value(&hm).unwrap();
  assert_eq!(json["date"], "2024-01-05");
  assert_eq!(json["scope"], "PHY");
  assert_eq!(json["data"], serde_json::json!([[0, 0, 10.0]]));
  assert_eq!(json["metricDefs"][BAL_TOTAL]["name"], "贷款余额");
}

// ─── Multi-trend ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn trend_by_branches_keeps_gaps_aligned() {
  let store = seeded(vec![
    fact(ymd(2024, 1, 5), Scope::Phy, "城东支行", BAL_TOTAL, 100.0),
    fact(ymd(2024, 1, 6), Scope::Phy, "城西支行", BAL_TOTAL, 80.0),
    fact(ymd(2024, 1, 7), Scope::Phy, "城东支行", BAL_TOTAL, 0.0),
  ])
  .await;
  let engine = AggregationEngine::new(&store, &store);

  let req = TrendRequest {
    metric: Some(BAL_TOTAL.to_owned()),
    branches: strings(&["城东支行", "城西支行"]),
    ..trend("PHY")
  };
  let resp = engine.multi_trend(&req).await.unwrap();

  assert_eq!(resp.dates, vec![ymd(2024, 1, 5), ymd(2024, 1, 6), ymd(2024, 1, 7)]);
  assert_eq!(resp.series[0].name, "城东支行");
  assert_eq!(resp.series[0].values, vec![Some(100.0), None, Some(0.0)]);
  assert_eq!(resp.series[1].values, vec![None, Some(80.0), None]);
  assert_eq!(resp.title, "趋势：PHY / 贷款余额");
  assert_eq!(resp.unit, "万元");
}

#[tokio::test]
async fn trend_by_metrics_names_series_by_metric() {
  let store = seeded(vec![
    fact(ymd(2024, 1, 5), Scope::Phy, "城东支行", BAL_TOTAL, 100.0),
    fact(ymd(2024, 1, 6), Scope::Phy, "城东支行", DOD_BAL, 5.0),
  ])
  .await;
  let engine = AggregationEngine::new(&store, &store);

  let req = TrendRequest {
    branch: Some("城东支行".to_owned()),
    metrics: strings(&[BAL_TOTAL, DOD_BAL]),
    ..trend("PHY")
  };
  let resp = engine.multi_trend(&req).await.unwrap();

  assert_eq!(resp.title, "趋势：PHY / 城东支行");
  assert_eq!(resp.unit, "万元");
  assert_eq!(resp.series[0].name, "贷款余额");
  assert_eq!(resp.series[0].values, vec![Some(100.0), None]);
  assert_eq!(resp.series[1].name, "余额较上日");
  assert_eq!(resp.series[1].values, vec![None, Some(5.0)]);
}

#[tokio::test]
async fn trend_without_a_mode_is_empty() {
  let store = seeded(vec![fact(ymd(2024, 1, 5), Scope::Phy, "城东支行", BAL_TOTAL, 1.0)]).await;
  let engine = AggregationEngine::new(&store, &store);

  // A metric with no branches selects neither mode.
  let req = TrendRequest { metric: Some(BAL_TOTAL.to_owned()), ..trend("PHY") };
  let resp = engine.multi_trend(&req).await.unwrap();
  assert_eq!(resp.title, "趋势：PHY");
  assert!(resp.dates.is_empty());
  assert!(resp.series.is_empty());

  let inverted = TrendRequest {
    metric: Some(BAL_TOTAL.to_owned()),
    branches: strings(&["城东支行"]),
    start: ymd(2024, 2, 1),
    ..trend("PHY")
  };
  assert!(engine.multi_trend(&inverted).await.unwrap().series.is_empty());
}

// ─── Growth ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn growth_divides_by_previous_base() {
  let store = seeded(vec![
    fact(ymd(2024, 1, 5), Scope::Phy, "城东支行", BAL_TOTAL, 200.0),
    fact(ymd(2024, 1, 5), Scope::Phy, "城东支行", DOD_BAL, 7.0),
    // 01-06 is absent: the axis steps straight from 01-05 to 01-08.
    fact(ymd(2024, 1, 8), Scope::Phy, "城东支行", BAL_TOTAL, 400.0),
    fact(ymd(2024, 1, 8), Scope::Phy, "城东支行", DOD_BAL, 100.0),
    fact(ymd(2024, 1, 9), Scope::Phy, "城东支行", DOD_BAL, 100.0),
  ])
  .await;
  let engine = AggregationEngine::new(&store, &store);

  let resp = engine.growth_series(&growth(&["城东支行"])).await.unwrap();
  assert_eq!(resp.dates, vec![ymd(2024, 1, 5), ymd(2024, 1, 8), ymd(2024, 1, 9)]);
  assert_eq!(resp.unit, "%");
  assert_eq!(resp.series[0].values, vec![None, Some(50.0), Some(25.0)]);
  assert_eq!(resp.title, "增长率：PHY（余额较上日 ÷ 上期贷款余额）");
}

#[tokio::test]
async fn growth_over_zero_base_is_absent() {
  let store = seeded(vec![
    fact(ymd(2024, 1, 5), Scope::Phy, "城东支行", BAL_TOTAL, 0.0),
    fact(ymd(2024, 1, 6), Scope::Phy, "城东支行", DOD_BAL, 5.0),
    fact(ymd(2024, 1, 6), Scope::Phy, "城东支行", BAL_TOTAL, 1e-12),
    fact(ymd(2024, 1, 7), Scope::Phy, "城东支行", DOD_BAL, 1e9),
  ])
  .await;
  let engine = AggregationEngine::new(&store, &store);

  let resp = engine.growth_series(&growth(&["城东支行", "城西支行"])).await.unwrap();
  assert_eq!(resp.series[0].values, vec![None, None, None]);
  // Unknown branch: a full-length series of gaps.
  assert_eq!(resp.series[1].values, vec![None, None, None]);
}

#[tokio::test]
async fn growth_with_no_dates_is_empty() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let engine = AggregationEngine::new(&store, &store);

  let resp = engine.growth_series(&growth(&["城东支行"])).await.unwrap();
  assert_eq!(resp.title, "增长率：PHY");
  assert_eq!(resp.unit, "%");
  assert!(resp.series.is_empty());
}

// ─── Export ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn report_mirrors_heatmap() {
  let d = ymd(2024, 1, 5);
  let store = seeded(vec![
    fact(d, Scope::Adj, "城东支行", BAL_TOTAL, 30.0),
    fact(d, Scope::Adj, "城西支行", BAL_TOTAL, 20.0),
  ])
  .await;
  let engine = AggregationEngine::new(&store, &store);

  let report = engine.export_report("ADJ", d, strings(&[BAL_TOTAL])).await.unwrap();
  assert_eq!(report.title, "贷款多视角日报分析");
  assert_eq!(report.scope, Scope::Adj);
  assert_eq!(report.branches.len(), 2);
  assert_eq!((report.min, report.max), (20.0, 30.0));

  let json = serde_json::to_value(&report).unwrap();
  assert_eq!(json["heatmapData"].as_array().unwrap().len(), 2);
}
