//! Header text → canonical metric code.
//!
//! The rule table is data: each rule is a keyword conjunction, and the first
//! rule whose keywords all occur in the header wins. Comparison qualifiers are
//! listed before bare quantities because a header such as `余额较上日`
//! contains both.

use trendhub_core::metric::{
  BAL_TOTAL, BOY_BAL, BOY_CNT, CNT_TOTAL, DOD_BAL, DOD_CNT, GR_BAL, GR_CNT,
  MOM_BAL, MOM_CNT, Y2M_BAL, Y2M_CNT,
};

// ─── Keywords ────────────────────────────────────────────────────────────────

pub const COUNT: &str = "户";
pub const BALANCE: &str = "余额";
pub const COUNT_TOTAL: &str = "户数";

pub const DAY_OVER_DAY: &str = "较上日";
pub const MONTH_OVER_MONTH: &str = "较上月";
pub const YEAR_START: &str = "较年初";
pub const YEAR_OVER_YEAR: &str = "增量较同期";
pub const GROWTH_RATE: &str = "增幅";

// ─── Rule table ──────────────────────────────────────────────────────────────

/// Revision of [`METRIC_RULES`]; bump when the table changes.
pub const METRIC_RULES_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy)]
pub struct MetricRule {
  pub all_of: &'static [&'static str],
  pub code:   &'static str,
}

const fn rule(all_of: &'static [&'static str], code: &'static str) -> MetricRule {
  MetricRule { all_of, code }
}

pub const METRIC_RULES: &[MetricRule] = &[
  rule(&[DAY_OVER_DAY, COUNT], DOD_CNT),
  rule(&[DAY_OVER_DAY, BALANCE], DOD_BAL),
  rule(&[MONTH_OVER_MONTH, COUNT], MOM_CNT),
  rule(&[MONTH_OVER_MONTH, BALANCE], MOM_BAL),
  rule(&[YEAR_START, COUNT], BOY_CNT),
  rule(&[YEAR_START, BALANCE], BOY_BAL),
  rule(&[YEAR_OVER_YEAR, COUNT], Y2M_CNT),
  rule(&[YEAR_OVER_YEAR, BALANCE], Y2M_BAL),
  rule(&[GROWTH_RATE, COUNT], GR_CNT),
  rule(&[GROWTH_RATE, BALANCE], GR_BAL),
  rule(&[COUNT_TOTAL], CNT_TOTAL),
  rule(&[BALANCE], BAL_TOTAL),
];

/// Resolve a column's concatenated header text to a metric code.
///
/// Whitespace is ignored. `None` marks a label or note column.
pub fn resolve(header_text: &str) -> Option<&'static str> {
  let compact: String =
    header_text.chars().filter(|c| !c.is_whitespace()).collect();
  METRIC_RULES
    .iter()
    .find(|r| r.all_of.iter().all(|kw| compact.contains(kw)))
    .map(|r| r.code)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bare_quantities_resolve_to_totals() {
    assert_eq!(resolve("贷款户数"), Some(CNT_TOTAL));
    assert_eq!(resolve("实体贷款(纯账面) 贷款余额"), Some(BAL_TOTAL));
  }

  #[test]
  fn comparison_beats_bare_quantity() {
    assert_eq!(resolve("余额较上日"), Some(DOD_BAL));
    assert_eq!(resolve("户数 较上日"), Some(DOD_CNT));
    assert_eq!(resolve("较上月 余额"), Some(MOM_BAL));
    assert_eq!(resolve("户数较上月"), Some(MOM_CNT));
    assert_eq!(resolve("余额较年初"), Some(BOY_BAL));
    assert_eq!(resolve("户数较年初"), Some(BOY_CNT));
    assert_eq!(resolve("余额增量较同期"), Some(Y2M_BAL));
    assert_eq!(resolve("户数增量较同期"), Some(Y2M_CNT));
    assert_eq!(resolve("余额增幅(%)"), Some(GR_BAL));
    assert_eq!(resolve("户数增幅"), Some(GR_CNT));
  }

  #[test]
  fn whitespace_inside_keywords_is_ignored() {
    assert_eq!(resolve("较 上 日\n余 额"), Some(DOD_BAL));
  }

  #[test]
  fn label_columns_do_not_resolve() {
    assert_eq!(resolve("单位"), None);
    assert_eq!(resolve("备注"), None);
    assert_eq!(resolve(""), None);
    assert_eq!(resolve("较上日"), None);
  }

  #[test]
  fn every_code_is_a_builtin_metric() {
    for rule in METRIC_RULES {
      assert!(
        trendhub_core::metric::BUILTIN_METRICS
          .iter()
          .any(|m| m.code == rule.code),
        "{} missing from builtin metrics",
        rule.code
      );
    }
  }
}
