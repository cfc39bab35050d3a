//! Metric metadata: display names, units, and how a metric is derived.
//!
//! The definitions themselves are owned by a [`MetricRegistry`] backend;
//! [`BUILTIN_METRICS`] is the reference table a fresh registry is seeded
//! with.
//!
//! [`MetricRegistry`]: crate::store::MetricRegistry

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

// ─── Canonical codes ─────────────────────────────────────────────────────────

pub const CNT_TOTAL: &str = "CNT_TOTAL";
pub const BAL_TOTAL: &str = "BAL_TOTAL";
pub const DOD_CNT: &str = "DOD_CNT";
pub const DOD_BAL: &str = "DOD_BAL";
pub const MOM_CNT: &str = "MOM_CNT";
pub const MOM_BAL: &str = "MOM_BAL";
pub const BOY_CNT: &str = "BOY_CNT";
pub const BOY_BAL: &str = "BOY_BAL";
pub const Y2M_CNT: &str = "Y2M_CNT";
pub const Y2M_BAL: &str = "Y2M_BAL";
pub const GR_CNT: &str = "GR_CNT";
pub const GR_BAL: &str = "GR_BAL";

// ─── Definitions ─────────────────────────────────────────────────────────────

/// How a metric relates to the raw totals.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MetricKind {
  /// A stock figure read straight off the report (count or balance).
  Raw,
  /// A period-over-period change of a raw figure.
  Delta,
  /// A percentage; stored as the literal printed number (`12.5` for 12.5%).
  Ratio,
}

/// Reference metadata for one metric code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDef {
  pub code:        String,
  pub name:        String,
  pub unit:        String,
  pub kind:        MetricKind,
  /// For deltas and ratios, the raw metric they are computed against.
  pub base_metric: Option<String>,
}

/// The slice of [`MetricDef`] a chart needs to label an axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricMeta {
  pub name: String,
  pub unit: String,
}

impl MetricMeta {
  /// Metadata for `code`, falling back to the bare code and an empty unit
  /// when the registry has no definition.
  pub fn lookup(defs: &BTreeMap<String, MetricDef>, code: &str) -> Self {
    match defs.get(code) {
      Some(def) => Self { name: def.name.clone(), unit: def.unit.clone() },
      None => Self { name: code.to_owned(), unit: String::new() },
    }
  }
}

/// Index a registry listing by code.
pub fn index_by_code(defs: Vec<MetricDef>) -> BTreeMap<String, MetricDef> {
  defs.into_iter().map(|d| (d.code.clone(), d)).collect()
}

// ─── Built-in table ──────────────────────────────────────────────────────────

/// Static row of [`BUILTIN_METRICS`].
#[derive(Debug, Clone, Copy)]
pub struct BuiltinMetric {
  pub code:        &'static str,
  pub name:        &'static str,
  pub unit:        &'static str,
  pub kind:        MetricKind,
  pub base_metric: Option<&'static str>,
}

impl BuiltinMetric {
  pub fn to_def(self) -> MetricDef {
    MetricDef {
      code:        self.code.to_owned(),
      name:        self.name.to_owned(),
      unit:        self.unit.to_owned(),
      kind:        self.kind,
      base_metric: self.base_metric.map(str::to_owned),
    }
  }
}

const fn builtin(
  code: &'static str,
  name: &'static str,
  unit: &'static str,
  kind: MetricKind,
  base_metric: Option<&'static str>,
) -> BuiltinMetric {
  BuiltinMetric { code, name, unit, kind, base_metric }
}

/// Every canonical metric the sheet parser can emit.
pub const BUILTIN_METRICS: &[BuiltinMetric] = &[
  builtin(CNT_TOTAL, "贷款户数", "户", MetricKind::Raw, None),
  builtin(BAL_TOTAL, "贷款余额", "万元", MetricKind::Raw, None),
  builtin(DOD_CNT, "户数较上日", "户", MetricKind::Delta, Some(CNT_TOTAL)),
  builtin(DOD_BAL, "余额较上日", "万元", MetricKind::Delta, Some(BAL_TOTAL)),
  builtin(MOM_CNT, "户数较上月", "户", MetricKind::Delta, Some(CNT_TOTAL)),
  builtin(MOM_BAL, "余额较上月", "万元", MetricKind::Delta, Some(BAL_TOTAL)),
  builtin(BOY_CNT, "户数较年初", "户", MetricKind::Delta, Some(CNT_TOTAL)),
  builtin(BOY_BAL, "余额较年初", "万元", MetricKind::Delta, Some(BAL_TOTAL)),
  builtin(Y2M_CNT, "户数增量较同期", "户", MetricKind::Delta, Some(CNT_TOTAL)),
  builtin(Y2M_BAL, "余额增量较同期", "万元", MetricKind::Delta, Some(BAL_TOTAL)),
  builtin(GR_CNT, "户数增幅", "%", MetricKind::Ratio, Some(CNT_TOTAL)),
  builtin(GR_BAL, "余额增幅", "%", MetricKind::Ratio, Some(BAL_TOTAL)),
];

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lookup_falls_back_to_code() {
    let defs = index_by_code(BUILTIN_METRICS.iter().map(|m| m.to_def()).collect());
    assert_eq!(MetricMeta::lookup(&defs, BAL_TOTAL).unit, "万元");

    let unknown = MetricMeta::lookup(&defs, "NPL_RATIO");
    assert_eq!(unknown.name, "NPL_RATIO");
    assert!(unknown.unit.is_empty());
  }

  #[test]
  fn derived_metrics_point_at_raw_bases() {
    for m in BUILTIN_METRICS.iter().filter(|m| m.kind != MetricKind::Raw) {
      let base = m.base_metric.unwrap();
      let base_def = BUILTIN_METRICS.iter().find(|b| b.code == base).unwrap();
      assert_eq!(base_def.kind, MetricKind::Raw, "{} -> {base}", m.code);
    }
  }

  #[test]
  fn kind_codes_are_lowercase() {
    assert_eq!(MetricKind::Ratio.to_string(), "ratio");
    assert_eq!("delta".parse::<MetricKind>().unwrap(), MetricKind::Delta);
  }
}
