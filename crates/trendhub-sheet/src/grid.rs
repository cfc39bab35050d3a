//! In-memory cell grid and workbook loading.
//!
//! Structure detection works on formatted text, so every cell renders through
//! [`Cell::text`], which never fails and does not depend on locale. Numeric
//! cells keep their native value for extraction.

use std::{borrow::Cow, io::Cursor};

use calamine::{Data, Range, Reader};
use chrono::NaiveDate;

use crate::error::{Error, Result};

// ─── Cell ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cell {
  #[default]
  Empty,
  Number(f64),
  Text(String),
  Bool(bool),
  /// A native date cell; any time-of-day component is dropped.
  Date(NaiveDate),
  /// A spreadsheet error value such as `#DIV/0!`.
  Error(String),
}

static EMPTY: Cell = Cell::Empty;

impl Cell {
  /// Formatted text of the cell.
  ///
  /// Integral numbers print without a fractional part, dates print as
  /// `YYYY-MM-DD`.
  pub fn text(&self) -> Cow<'_, str> {
    match self {
      Cell::Empty => Cow::Borrowed(""),
      Cell::Number(n) => Cow::Owned(format_number(*n)),
      Cell::Text(s) => Cow::Borrowed(s),
      Cell::Bool(true) => Cow::Borrowed("TRUE"),
      Cell::Bool(false) => Cow::Borrowed("FALSE"),
      Cell::Date(d) => Cow::Owned(d.format("%Y-%m-%d").to_string()),
      Cell::Error(e) => Cow::Borrowed(e),
    }
  }

  /// Formatted text with every whitespace character removed.
  pub fn compact_text(&self) -> String {
    self.text().chars().filter(|c| !c.is_whitespace()).collect()
  }

  fn from_data(data: &Data) -> Self {
    match data {
      Data::Empty => Cell::Empty,
      Data::Int(i) => Cell::Number(*i as f64),
      Data::Float(f) => Cell::Number(*f),
      Data::String(s) => Cell::Text(s.clone()),
      Data::Bool(b) => Cell::Bool(*b),
      Data::DateTime(dt) => match dt.as_datetime() {
        Some(ndt) => Cell::Date(ndt.date()),
        None => Cell::Number(dt.as_f64()),
      },
      Data::DateTimeIso(s) => match trendhub_core::date::normalize(s) {
        Some(d) => Cell::Date(d),
        None => Cell::Text(s.clone()),
      },
      Data::DurationIso(s) => Cell::Text(s.clone()),
      Data::Error(e) => Cell::Error(format!("#{e:?}")),
    }
  }
}

fn format_number(n: f64) -> String {
  if n.fract() == 0.0 && n.abs() < 1e15 {
    format!("{}", n as i64)
  } else {
    format!("{n}")
  }
}

// ─── Grid ────────────────────────────────────────────────────────────────────

/// A rectangular view of one worksheet, addressed by absolute zero-based
/// `(row, column)`. Out-of-range reads yield [`Cell::Empty`].
#[derive(Debug, Clone, Default)]
pub struct CellGrid {
  rows:  Vec<Vec<Cell>>,
  width: usize,
}

impl CellGrid {
  pub fn from_rows(rows: Vec<Vec<Cell>>) -> Self {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    Self { rows, width }
  }

  /// Build a grid of text cells; blank strings become empty cells.
  pub fn from_strings<R, S>(rows: impl IntoIterator<Item = R>) -> Self
  where
    R: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    Self::from_rows(
      rows
        .into_iter()
        .map(|row| {
          row
            .into_iter()
            .map(|s| match s.as_ref() {
              t if t.trim().is_empty() => Cell::Empty,
              t => Cell::Text(t.to_owned()),
            })
            .collect()
        })
        .collect(),
    )
  }

  /// Load the first worksheet of an `.xlsx`, `.xls`, `.xlsb`, or `.ods`
  /// workbook held in memory.
  pub fn from_workbook_bytes(bytes: &[u8]) -> Result<Self> {
    let mut workbook =
      calamine::open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;
    let range = workbook.worksheet_range_at(0).ok_or(Error::NoWorksheet)??;
    Ok(Self::from_range(&range))
  }

  /// Copy a calamine range, honouring its start offset so indices stay
  /// absolute.
  pub fn from_range(range: &Range<Data>) -> Self {
    let (row0, col0) = range
      .start()
      .map(|(r, c)| (r as usize, c as usize))
      .unwrap_or((0, 0));
    let (height, width) = range.get_size();
    if height == 0 || width == 0 {
      return Self::default();
    }

    let mut rows = vec![vec![Cell::Empty; col0 + width]; row0 + height];
    for (r, c, data) in range.cells() {
      rows[row0 + r][col0 + c] = Cell::from_data(data);
    }
    Self { rows, width: col0 + width }
  }

  /// Number of rows, including leading empty ones.
  pub fn height(&self) -> usize { self.rows.len() }

  /// Widest row observed.
  pub fn width(&self) -> usize { self.width }

  /// Index of the last row, or `None` for an empty grid.
  pub fn last_row(&self) -> Option<usize> { self.rows.len().checked_sub(1) }

  pub fn get(&self, row: usize, col: usize) -> &Cell {
    self
      .rows
      .get(row)
      .and_then(|r| r.get(col))
      .unwrap_or(&EMPTY)
  }

  pub fn text(&self, row: usize, col: usize) -> Cow<'_, str> {
    self.get(row, col).text()
  }

  pub fn compact_text(&self, row: usize, col: usize) -> String {
    self.get(row, col).compact_text()
  }

  /// Concatenated compact text of every cell in `row`.
  pub fn row_text(&self, row: usize) -> String {
    (0..self.width).map(|c| self.compact_text(row, c)).collect()
  }
}
