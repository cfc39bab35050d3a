//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Business dates are stored as `YYYY-MM-DD` so that lexical order and
//! `BETWEEN` match calendar order. Scopes and metric kinds are stored as
//! their wire codes.

use chrono::NaiveDate;
use trendhub_core::{Fact, MetricDef, MetricKind, Scope};

use crate::{Error, Result};

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Scope ───────────────────────────────────────────────────────────────────

pub fn encode_scope(s: Scope) -> &'static str { s.code() }

pub fn decode_scope(s: &str) -> Result<Scope> { Ok(Scope::from_code(s)?) }

// ─── MetricKind ──────────────────────────────────────────────────────────────

pub fn encode_metric_kind(k: MetricKind) -> &'static str { k.into() }

pub fn decode_metric_kind(s: &str) -> Result<MetricKind> {
  s.parse()
    .map_err(|_| trendhub_core::Error::UnknownMetricKind(s.to_owned()).into())
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column values for one `fact_trend` upsert, owned so they can cross into the
/// database thread.
pub struct FactParams {
  pub biz_date:    String,
  pub scope:       &'static str,
  pub branch:      String,
  pub metric:      String,
  pub value:       Option<f64>,
  pub source_file: String,
}

impl From<Fact> for FactParams {
  fn from(f: Fact) -> Self {
    Self {
      biz_date:    encode_date(f.date),
      scope:       encode_scope(f.scope),
      branch:      f.branch,
      metric:      f.metric,
      value:       f.value,
      source_file: f.source_file,
    }
  }
}

/// Raw values read directly from a `fact_trend` row.
pub struct RawFact {
  pub biz_date:    String,
  pub scope:       String,
  pub branch:      String,
  pub metric:      String,
  pub value:       Option<f64>,
  pub source_file: String,
}

impl RawFact {
  /// Map a row selected with [`crate::schema::FACT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      biz_date:    row.get(0)?,
      scope:       row.get(1)?,
      branch:      row.get(2)?,
      metric:      row.get(3)?,
      value:       row.get(4)?,
      source_file: row.get(5)?,
    })
  }

  pub fn into_fact(self) -> Result<Fact> {
    Ok(Fact {
      date:        decode_date(&self.biz_date)?,
      scope:       decode_scope(&self.scope)?,
      branch:      self.branch,
      metric:      self.metric,
      value:       self.value,
      source_file: self.source_file,
    })
  }
}

/// Raw values read directly from a `metric_def` row.
pub struct RawMetricDef {
  pub code:        String,
  pub name:        String,
  pub unit:        String,
  pub kind:        String,
  pub base_metric: Option<String>,
}

impl RawMetricDef {
  pub fn into_def(self) -> Result<MetricDef> {
    Ok(MetricDef {
      code:        self.code,
      name:        self.name,
      unit:        self.unit,
      kind:        decode_metric_kind(&self.kind)?,
      base_metric: self.base_metric,
    })
  }
}
