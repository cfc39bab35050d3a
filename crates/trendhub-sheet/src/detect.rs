//! Sheet structure inference: header depth, branch-name column, and the
//! column where the adjusted scope starts.
//!
//! The three passes are independent heuristics over the cell grid. Each one
//! reports how it reached its answer so that misfires can be audited; the
//! midpoint fallback in particular is a guess and is flagged for review.

use serde::Serialize;
use trendhub_core::Scope;

use crate::{
  grid::CellGrid,
  metric::{
    BALANCE, COUNT_TOTAL, DAY_OVER_DAY, GROWTH_RATE, MONTH_OVER_MONTH, YEAR_START,
  },
  parse::parse_text_number,
};

// ─── Tables ──────────────────────────────────────────────────────────────────

/// The literal header label of the branch-name column ("unit").
pub const BRANCH_LABEL: &str = "单位";

/// Keywords marking the adjusted / write-off / reinstated scope.
pub const ADJUSTED_KEYWORDS: &[&str] = &["还原", "剔转", "核销"];

/// Any of these in a row marks it as part of the header block.
///
/// Counts match on the two-character label only: a bare `户` also appears in
/// department names such as `小微客户部`.
pub const HEADER_KEYWORDS: &[&str] = &[
  "纯账面",
  "还原",
  "剔转",
  "核销",
  DAY_OVER_DAY,
  MONTH_OVER_MONTH,
  YEAR_START,
  "较同期",
  GROWTH_RATE,
  COUNT_TOTAL,
  BALANCE,
  BRANCH_LABEL,
];

/// Suffixes of organisational-unit names.
pub const BRANCH_SUFFIXES: &[&str] =
  &["支行", "分行", "营业部", "分理处", "中心", "部"];

pub const DEFAULT_HEADER_DEPTH: usize = 5;
const HEADER_SCAN_LAST_ROW: usize = 12;
const SCOPE_SCAN_LAST_ROW: usize = 8;
const BRANCH_SAMPLE_ROWS: usize = 10;

// ─── Layout ──────────────────────────────────────────────────────────────────

/// How the header depth was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HeaderDepthSource {
  /// Last row in the scan window containing a header keyword.
  Keyword,
  /// No row matched; [`DEFAULT_HEADER_DEPTH`] was used.
  Default,
}

/// How the branch-name column was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BranchColumnSource {
  /// A header cell carries the branch label.
  HeaderLabel { row: usize },
  /// Most name-like cells over sampled data rows.
  Scored { score: usize },
}

/// How the adjusted-scope boundary was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScopeBoundarySource {
  /// Leftmost column whose header mentions an adjusted-scope keyword.
  Keyword { row: usize },
  /// No keyword anywhere; the boundary is the column-count midpoint.
  Midpoint,
}

/// The inferred structure of one sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetLayout {
  /// Index of the bottom header row; data starts on the next row.
  pub header_depth:          usize,
  pub header_depth_source:   HeaderDepthSource,
  pub branch_column:         usize,
  pub branch_column_source:  BranchColumnSource,
  /// First column classified [`Scope::Adj`].
  pub scope_boundary:        usize,
  pub scope_boundary_source: ScopeBoundarySource,
  pub column_count:          usize,
}

impl SheetLayout {
  /// [`Scope::Adj`] at or after the boundary, [`Scope::Phy`] before it.
  pub fn scope_of(&self, column: usize) -> Scope {
    if column >= self.scope_boundary {
      Scope::Adj
    } else {
      Scope::Phy
    }
  }

  /// Whether a best-effort fallback decided the scope split.
  pub fn needs_review(&self) -> bool {
    self.scope_boundary_source == ScopeBoundarySource::Midpoint
  }
}

// ─── Passes ──────────────────────────────────────────────────────────────────

/// Run all three passes.
pub fn detect(grid: &CellGrid) -> SheetLayout {
  let (header_depth, header_depth_source) = header_depth(grid);
  let (branch_column, branch_column_source) = branch_column(grid, header_depth);
  let (scope_boundary, scope_boundary_source) = scope_boundary(grid);

  SheetLayout {
    header_depth,
    header_depth_source,
    branch_column,
    branch_column_source,
    scope_boundary,
    scope_boundary_source,
    column_count: grid.width(),
  }
}

/// The last row within the first thirteen that contains any header keyword.
///
/// Later hits override earlier ones: the bottom header row is the most
/// specific one.
pub fn header_depth(grid: &CellGrid) -> (usize, HeaderDepthSource) {
  let Some(last_row) = grid.last_row() else {
    return (DEFAULT_HEADER_DEPTH, HeaderDepthSource::Default);
  };

  (0..=last_row.min(HEADER_SCAN_LAST_ROW))
    .filter(|&r| {
      let text = grid.row_text(r);
      HEADER_KEYWORDS.iter().any(|kw| text.contains(kw))
    })
    .last()
    .map(|r| (r, HeaderDepthSource::Keyword))
    .unwrap_or((DEFAULT_HEADER_DEPTH, HeaderDepthSource::Default))
}

/// Locate the branch-name column.
///
/// A header cell reading exactly [`BRANCH_LABEL`] is authoritative, then one
/// merely containing it. Failing both, each column counts the cells in the ten
/// rows below the header that look like a branch name. Ties go to the
/// leftmost column.
pub fn branch_column(
  grid: &CellGrid,
  header_depth: usize,
) -> (usize, BranchColumnSource) {
  let header_rows = match grid.last_row() {
    Some(last) => 0..=header_depth.min(last),
    None => return (0, BranchColumnSource::Scored { score: 0 }),
  };

  let find_label = |matches: &dyn Fn(&str) -> bool| {
    header_rows.clone().find_map(|r| {
      (0..grid.width())
        .find(|&c| matches(grid.compact_text(r, c).as_str()))
        .map(|c| (c, BranchColumnSource::HeaderLabel { row: r }))
    })
  };
  if let Some(found) = find_label(&|t| t == BRANCH_LABEL)
    .or_else(|| find_label(&|t| t.contains(BRANCH_LABEL)))
  {
    return found;
  }

  let first = header_depth + 1;
  let last = (header_depth + BRANCH_SAMPLE_ROWS).min(grid.height().saturating_sub(1));

  let mut best = (0, 0);
  for c in 0..grid.width() {
    let score = (first..=last)
      .filter(|&r| looks_like_branch(&grid.compact_text(r, c)))
      .count();
    if score > best.1 {
      best = (c, score);
    }
  }
  (best.0, BranchColumnSource::Scored { score: best.1 })
}

/// An organisational suffix, or any non-numeric text of two or more
/// characters. Every qualifying cell weighs the same.
fn looks_like_branch(text: &str) -> bool {
  BRANCH_SUFFIXES.iter().any(|s| text.contains(s))
    || (text.chars().count() >= 2 && parse_text_number(text).is_none())
}

/// The leftmost column, over the first nine rows, mentioning an
/// adjusted-scope keyword.
///
/// With no keyword anywhere the split falls back to the column-count
/// midpoint. That is a guess which misclassifies any sheet not laid out as
/// two equal halves, so the layout is flagged via
/// [`SheetLayout::needs_review`].
pub fn scope_boundary(grid: &CellGrid) -> (usize, ScopeBoundarySource) {
  let mut found: Option<(usize, usize)> = None;

  if let Some(last_row) = grid.last_row() {
    for r in 0..=last_row.min(SCOPE_SCAN_LAST_ROW) {
      for c in 0..grid.width() {
        if found.is_some_and(|(col, _)| col <= c) {
          break;
        }
        let text = grid.compact_text(r, c);
        if ADJUSTED_KEYWORDS.iter().any(|kw| text.contains(kw)) {
          found = Some((c, r));
        }
      }
    }
  }

  match found {
    Some((col, row)) => (col, ScopeBoundarySource::Keyword { row }),
    None => (grid.width() / 2, ScopeBoundarySource::Midpoint),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn grid(rows: &[&[&str]]) -> CellGrid {
    CellGrid::from_strings(rows.iter().map(|r| r.iter().copied()))
  }

  // ── Header depth ────────────────────────────────────────────────────────

  #[test]
  fn header_depth_is_last_keyword_row() {
    let g = grid(&[
      &["各网点贷款统计表"],
      &["单位", "实体贷款（纯账面）", "", "实体贷款（还原剔转）"],
      &["", "余额", "较上日", "余额"],
      &["城东支行", "100", "5", "110"],
    ]);
    assert_eq!(header_depth(&g), (2, HeaderDepthSource::Keyword));
  }

  #[test]
  fn header_depth_defaults_to_five() {
    let g = grid(&[&["a"], &["b"]]);
    assert_eq!(header_depth(&g), (5, HeaderDepthSource::Default));
    assert_eq!(
      header_depth(&CellGrid::default()),
      (5, HeaderDepthSource::Default)
    );
  }

  #[test]
  fn header_scan_stops_after_row_twelve() {
    let mut rows: Vec<Vec<&str>> = vec![vec!["余额"]];
    rows.extend(std::iter::repeat_n(vec!["x"], 12));
    rows.push(vec!["余额"]);
    let g = CellGrid::from_strings(rows);
    assert_eq!(g.height(), 14);
    assert_eq!(header_depth(&g), (0, HeaderDepthSource::Keyword));
  }

  #[test]
  fn customer_department_row_is_data_not_header() {
    let g = grid(&[
      &["单位", "实体贷款（纯账面）", "", "实体贷款（还原剔转）", ""],
      &["", "贷款户数", "余额", "贷款户数", "余额"],
      &["城东支行", "120", "1000", "121", "1100"],
      &["小微客户部", "5", "50", "5", "55"],
      &["个人客户中心", "8", "80", "8", "88"],
    ]);
    assert_eq!(header_depth(&g), (1, HeaderDepthSource::Keyword));
  }

  // ── Branch column ───────────────────────────────────────────────────────

  #[test]
  fn branch_label_is_authoritative() {
    let g = grid(&[
      &["序号", "单位", "余额"],
      &["1", "城东支行", "100"],
    ]);
    assert_eq!(
      branch_column(&g, 0),
      (1, BranchColumnSource::HeaderLabel { row: 0 })
    );
  }

  #[test]
  fn exact_label_beats_earlier_substring() {
    let g = grid(&[
      &["单位：万元", "", ""],
      &["序号", "单位", "余额"],
      &["1", "城东支行", "100"],
    ]);
    assert_eq!(
      branch_column(&g, 1),
      (1, BranchColumnSource::HeaderLabel { row: 1 })
    );
  }

  #[test]
  fn scoring_skips_numeric_columns() {
    let g = grid(&[
      &["序号", "网点", "余额"],
      &["1", "城东支行", "100"],
      &["2", "城西支行", "200"],
      &["3", "营业部", "300"],
      &["4", "张三", "400"],
    ]);
    assert_eq!(
      branch_column(&g, 0),
      (1, BranchColumnSource::Scored { score: 4 })
    );
  }

  #[test]
  fn scoring_counts_cells_not_suffixes() {
    let g = grid(&[
      &["姓名", "网点"],
      &["张三", "城东支行"],
      &["李四", "城西支行"],
      &["王五", ""],
    ]);
    assert_eq!(
      branch_column(&g, 0),
      (0, BranchColumnSource::Scored { score: 3 })
    );
  }

  #[test]
  fn scoring_ties_go_left() {
    let g = grid(&[&["h", "h"], &["城东支行", "城西支行"]]);
    assert_eq!(
      branch_column(&g, 0),
      (0, BranchColumnSource::Scored { score: 1 })
    );
  }

  // ── Scope boundary ──────────────────────────────────────────────────────

  #[test]
  fn adjusted_keyword_at_column_six_splits_ten_columns() {
    let mut header = vec![""; 10];
    header[1] = "实体贷款（纯账面）";
    header[6] = "实体贷款（还原剔转）";
    let g = CellGrid::from_strings([header]);

    let layout = detect(&g);
    assert_eq!(layout.scope_boundary, 6);
    assert_eq!(layout.scope_boundary_source, ScopeBoundarySource::Keyword { row: 0 });
    assert!(!layout.needs_review());

    assert_eq!(layout.column_count, 10);
    assert!((0..6).all(|c| layout.scope_of(c) == Scope::Phy));
    assert!((6..10).all(|c| layout.scope_of(c) == Scope::Adj));
  }

  #[test]
  fn boundary_is_minimum_column_across_rows() {
    let g = grid(&[
      &["", "", "", "", "核销"],
      &["", "", "剔转", "", ""],
    ]);
    assert_eq!(scope_boundary(&g), (2, ScopeBoundarySource::Keyword { row: 1 }));
  }

  #[test]
  fn missing_keyword_falls_back_to_midpoint_and_flags_review() {
    let g = grid(&[&["单位", "余额", "余额", "余额", "余额", "余额"]]);
    let layout = detect(&g);
    assert_eq!(layout.scope_boundary, 3);
    assert_eq!(layout.scope_boundary_source, ScopeBoundarySource::Midpoint);
    assert!(layout.needs_review());
  }

  #[test]
  fn keyword_below_row_eight_is_ignored() {
    let mut rows: Vec<Vec<&str>> = std::iter::repeat_n(vec!["", ""], 9).collect();
    rows.push(vec!["", "还原"]);
    let g = CellGrid::from_strings(rows);
    assert_eq!(scope_boundary(&g), (1, ScopeBoundarySource::Midpoint));
  }
}
