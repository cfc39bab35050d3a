//! [`SqliteStore`], the SQLite implementation of [`FactStore`] and
//! [`MetricRegistry`].

use std::path::Path;

use chrono::NaiveDate;
use trendhub_core::{
  Fact, MetricDef, Scope,
  metric::BUILTIN_METRICS,
  store::{DateBounds, FactStore, MetricRegistry, Period},
};

use crate::{
  Result,
  encode::{
    FactParams, RawFact, RawMetricDef, decode_date, decode_scope, encode_date,
    encode_metric_kind, encode_scope,
  },
  schema::{FACT_COLUMNS, SCHEMA, SEED_METRIC, UPSERT_FACT},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A trend store backed by a single SQLite file.
///
/// Clones share one background connection thread.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path`, run schema initialisation, and seed
  /// the metric registry.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open a private in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  pub(crate) async fn init_schema(&self) -> Result<()> {
    let seeds: Vec<MetricDef> = BUILTIN_METRICS.iter().map(|m| m.to_def()).collect();

    self
      .conn
      .call(move |conn| {
        conn.execute_batch(SCHEMA)?;
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(SEED_METRIC)?;
          for d in &seeds {
            stmt.execute(rusqlite::params![
              d.code,
              d.name,
              d.unit,
              encode_metric_kind(d.kind),
              d.base_metric,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run a `SELECT` of [`FACT_COLUMNS`] with positional string parameters and
  /// decode every row.
  async fn select_facts(&self, sql: String, args: Vec<String>) -> Result<Vec<Fact>> {
    let raws: Vec<RawFact> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(args.iter()), RawFact::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFact::into_fact).collect()
  }

  /// Run a single-column `SELECT DISTINCT` and collect the strings.
  async fn select_strings(&self, sql: &'static str, args: Vec<String>) -> Result<Vec<String>> {
    let values = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(args.iter()), |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(values)
  }
}

/// `?, ?, ?` with `n` markers, numbered from `first`.
fn placeholders(first: usize, n: usize) -> String {
  (first..first + n)
    .map(|i| format!("?{i}"))
    .collect::<Vec<_>>()
    .join(", ")
}

// ─── FactStore impl ──────────────────────────────────────────────────────────

impl FactStore for SqliteStore {
  type Error = crate::Error;

  // ── Writes ──────────────────────────────────────────────────────────────

  async fn upsert_batch(&self, facts: Vec<Fact>) -> Result<usize> {
    if facts.is_empty() {
      return Ok(0);
    }
    let params: Vec<FactParams> = facts.into_iter().map(FactParams::from).collect();

    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut written = 0usize;
        {
          let mut stmt = tx.prepare(UPSERT_FACT)?;
          for p in &params {
            written += stmt.execute(rusqlite::params![
              p.biz_date,
              p.scope,
              p.branch,
              p.metric,
              p.value,
              p.source_file,
            ])?;
          }
        }
        tx.commit()?;
        Ok(written)
      })
      .await?;

    Ok(written)
  }

  // ── Axis listings ───────────────────────────────────────────────────────

  async fn distinct_scopes(&self) -> Result<Vec<Scope>> {
    self
      .select_strings("SELECT DISTINCT scope FROM fact_trend ORDER BY scope", vec![])
      .await?
      .iter()
      .map(|s| decode_scope(s))
      .collect()
  }

  async fn distinct_branches(&self, scope: Scope) -> Result<Vec<String>> {
    self
      .select_strings(
        "SELECT DISTINCT branch FROM fact_trend WHERE scope = ?1 ORDER BY branch",
        vec![encode_scope(scope).to_owned()],
      )
      .await
  }

  async fn distinct_dates(&self, scope: Scope, period: Period) -> Result<Vec<NaiveDate>> {
    self
      .select_strings(
        "SELECT DISTINCT biz_date FROM fact_trend
         WHERE scope = ?1 AND biz_date BETWEEN ?2 AND ?3
         ORDER BY biz_date",
        vec![
          encode_scope(scope).to_owned(),
          encode_date(period.start),
          encode_date(period.end),
        ],
      )
      .await?
      .iter()
      .map(|s| decode_date(s))
      .collect()
  }

  async fn date_bounds(&self) -> Result<Option<DateBounds>> {
    let (min, max): (Option<String>, Option<String>) = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT MIN(biz_date), MAX(biz_date) FROM fact_trend",
          [],
          |row| Ok((row.get(0)?, row.get(1)?)),
        )?)
      })
      .await?;

    match (min, max) {
      (Some(min), Some(max)) => Ok(Some(DateBounds {
        min: decode_date(&min)?,
        max: decode_date(&max)?,
      })),
      _ => Ok(None),
    }
  }

  // ── Fact reads ──────────────────────────────────────────────────────────

  async fn facts_by_date_scope_metrics(
    &self,
    date:    NaiveDate,
    scope:   Scope,
    metrics: &[String],
  ) -> Result<Vec<Fact>> {
    if metrics.is_empty() {
      return Ok(vec![]);
    }
    let sql = format!(
      "SELECT {FACT_COLUMNS} FROM fact_trend
       WHERE biz_date = ?1 AND scope = ?2 AND metric IN ({})
       ORDER BY branch, metric",
      placeholders(3, metrics.len())
    );
    let mut args = vec![encode_date(date), encode_scope(scope).to_owned()];
    args.extend(metrics.iter().cloned());

    self.select_facts(sql, args).await
  }

  async fn facts_by_scope_metric_branches(
    &self,
    scope:    Scope,
    metric:   &str,
    branches: &[String],
    period:   Period,
  ) -> Result<Vec<Fact>> {
    if branches.is_empty() {
      return Ok(vec![]);
    }
    let sql = format!(
      "SELECT {FACT_COLUMNS} FROM fact_trend
       WHERE scope = ?1 AND metric = ?2 AND biz_date BETWEEN ?3 AND ?4
         AND branch IN ({})
       ORDER BY biz_date, branch",
      placeholders(5, branches.len())
    );
    let mut args = vec![
      encode_scope(scope).to_owned(),
      metric.to_owned(),
      encode_date(period.start),
      encode_date(period.end),
    ];
    args.extend(branches.iter().cloned());

    self.select_facts(sql, args).await
  }

  async fn facts_by_scope_branch_metrics(
    &self,
    scope:   Scope,
    branch:  &str,
    metrics: &[String],
    period:  Period,
  ) -> Result<Vec<Fact>> {
    if metrics.is_empty() {
      return Ok(vec![]);
    }
    let sql = format!(
      "SELECT {FACT_COLUMNS} FROM fact_trend
       WHERE scope = ?1 AND branch = ?2 AND biz_date BETWEEN ?3 AND ?4
         AND metric IN ({})
       ORDER BY biz_date, metric",
      placeholders(5, metrics.len())
    );
    let mut args = vec![
      encode_scope(scope).to_owned(),
      branch.to_owned(),
      encode_date(period.start),
      encode_date(period.end),
    ];
    args.extend(metrics.iter().cloned());

    self.select_facts(sql, args).await
  }
}

// ─── MetricRegistry impl ─────────────────────────────────────────────────────

impl MetricRegistry for SqliteStore {
  type Error = crate::Error;

  async fn list_metrics(&self) -> Result<Vec<MetricDef>> {
    let raws: Vec<RawMetricDef> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT metric, name, unit, kind, base_metric FROM metric_def ORDER BY metric",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawMetricDef {
              code:        row.get(0)?,
              name:        row.get(1)?,
              unit:        row.get(2)?,
              kind:        row.get(3)?,
              base_metric: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMetricDef::into_def).collect()
  }
}
