//! Error types for the report-sheet parser.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("workbook could not be read: {0}")]
  Workbook(#[from] calamine::Error),

  #[error("workbook contains no worksheet")]
  NoWorksheet,

  /// Every data row was filtered out. Almost always a header or branch-column
  /// detection miss rather than a genuinely empty report.
  #[error(
    "sheet produced no facts (header depth {header_depth}, branch column \
     {branch_column}, {metric_columns} metric columns); check that the header \
     rows are intact and the branch column is detectable"
  )]
  NoFacts {
    header_depth:   usize,
    branch_column:  usize,
    metric_columns: usize,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
