//! Cell-to-fact extraction for one report sheet.
//!
//! Pipeline:
//!   CellGrid
//!     └─ detect::detect()        → SheetLayout
//!          └─ metric_columns()   → Vec<MetricColumn>
//!               └─ data rows     → filter branch, parse numbers
//!                    └─ Vec<Fact>

use chrono::NaiveDate;
use serde::Serialize;
use trendhub_core::{Fact, Scope, date};

use crate::{
  detect::{self, SheetLayout},
  error::{Error, Result},
  grid::{Cell, CellGrid},
  metric,
};

// ─── Business date ───────────────────────────────────────────────────────────

/// Where a sheet's business date came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DateSource {
  FileName,
  Cell { row: usize, col: usize },
}

/// Conventional position of the date in the report title block.
const DATE_CELL: (usize, usize) = (1, 1);
const DATE_SCAN_LAST_ROW: usize = 8;

/// Resolve the business date of a report: the filename first, then the
/// conventional title cell, then every cell of the first nine rows.
pub fn business_date(
  file_name: &str,
  grid: &CellGrid,
) -> Option<(NaiveDate, DateSource)> {
  if let Some(d) = date::normalize(file_name) {
    return Some((d, DateSource::FileName));
  }
  sheet_date(grid)
}

/// The in-sheet half of [`business_date`].
pub fn sheet_date(grid: &CellGrid) -> Option<(NaiveDate, DateSource)> {
  let probe = |row: usize, col: usize| {
    date::normalize(&grid.text(row, col))
      .map(|d| (d, DateSource::Cell { row, col }))
  };

  let (row, col) = DATE_CELL;
  if let Some(found) = probe(row, col) {
    return Some(found);
  }

  let last_row = grid.last_row()?;
  (0..=last_row.min(DATE_SCAN_LAST_ROW))
    .find_map(|r| (0..grid.width()).find_map(|c| probe(r, c)))
}

// ─── Numbers ─────────────────────────────────────────────────────────────────

/// Read a numeric value from a cell.
///
/// Native numbers are taken as-is. Text has thousands separators and one
/// trailing `%` removed and is parsed as a real number. The percent sign
/// does NOT rescale: `"12.5%"` yields `12.5`, matching the unit stored for
/// ratio metrics. Anything unparseable yields `None`.
pub fn parse_number(cell: &Cell) -> Option<f64> {
  match cell {
    Cell::Number(n) if n.is_finite() => Some(*n),
    Cell::Text(s) => parse_text_number(s),
    _ => None,
  }
}

pub(crate) fn parse_text_number(text: &str) -> Option<f64> {
  let cleaned: String = text
    .trim()
    .chars()
    .filter(|c| !matches!(c, ',' | '，'))
    .collect();
  let cleaned = cleaned.trim();
  let cleaned = cleaned.strip_suffix('%').unwrap_or(cleaned).trim_end();
  if cleaned.is_empty() {
    return None;
  }
  cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

// ─── Branch rows ─────────────────────────────────────────────────────────────

/// Aggregate and label rows: totals, header leakage.
pub const EXCLUDED_BRANCH_FRAGMENTS: &[&str] = &["合计", "总计", "各项贷款", "单位"];

/// Footnote markers.
pub const EXCLUDED_BRANCH_PREFIXES: &[&str] = &["注", "说明", "备注", "*", "※"];

/// Whether a branch-column value names an aggregate or label row rather than
/// a real branch.
pub fn is_excluded_branch(name: &str) -> bool {
  let compact: String = name.chars().filter(|c| !c.is_whitespace()).collect();
  compact.is_empty()
    || EXCLUDED_BRANCH_FRAGMENTS.iter().any(|f| compact.contains(f))
    || EXCLUDED_BRANCH_PREFIXES.iter().any(|p| compact.starts_with(p))
}

// ─── Metric columns ──────────────────────────────────────────────────────────

/// A column that carries values for one metric under one scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricColumn {
  pub column: usize,
  pub metric: &'static str,
  pub scope:  Scope,
}

/// Resolve every column's header block (rows `0..=header_depth`) to a
/// metric. Unresolved columns are omitted; the result is ordered by column.
pub fn metric_columns(grid: &CellGrid, layout: &SheetLayout) -> Vec<MetricColumn> {
  (0..grid.width())
    .filter(|&c| c != layout.branch_column)
    .filter_map(|c| {
      let header: String = (0..=layout.header_depth)
        .map(|r| grid.compact_text(r, c))
        .collect();
      metric::resolve(&header).map(|metric| MetricColumn {
        column: c,
        metric,
        scope: layout.scope_of(c),
      })
    })
    .collect()
}

// ─── Sheet ───────────────────────────────────────────────────────────────────

/// Facts extracted from one sheet, together with the decisions that produced
/// them.
#[derive(Debug, Clone)]
pub struct ParsedSheet {
  pub layout:         SheetLayout,
  pub metric_columns: Vec<MetricColumn>,
  pub facts:          Vec<Fact>,
}

/// Extract every fact from `grid`, dated `business_date` and attributed to
/// `source_file`.
///
/// Fails with [`Error::NoFacts`] when nothing survives filtering: that
/// signals a detection miss, not an empty report.
pub fn parse_sheet(
  grid: &CellGrid,
  business_date: NaiveDate,
  source_file: &str,
) -> Result<ParsedSheet> {
  let layout = detect::detect(grid);
  let metric_columns = metric_columns(grid, &layout);

  let mut facts = Vec::new();
  for row in (layout.header_depth + 1)..grid.height() {
    let branch = grid.text(row, layout.branch_column);
    let branch = branch.trim();
    if is_excluded_branch(branch) {
      continue;
    }

    for mc in &metric_columns {
      let Some(value) = parse_number(grid.get(row, mc.column)) else {
        continue;
      };
      facts.push(Fact {
        date:        business_date,
        scope:       mc.scope,
        branch:      branch.to_owned(),
        metric:      mc.metric.to_owned(),
        value:       Some(value),
        source_file: source_file.to_owned(),
      });
    }
  }

  if facts.is_empty() {
    return Err(Error::NoFacts {
      header_depth:   layout.header_depth,
      branch_column:  layout.branch_column,
      metric_columns: metric_columns.len(),
    });
  }

  Ok(ParsedSheet { layout, metric_columns, facts })
}
