//! Business-date recognition for filenames and loose cell text.
//!
//! Report files carry their business date somewhere in the filename
//! (`贷款日报_20240105.xlsx`, `2024.01.05 loans.xlsx`) or in a title cell.
//! [`normalize`] is an existence probe: `None` means "no date here", never an
//! error.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// Separators accepted between year, month, and day. `年`/`月` cover the
/// `2024年01月05日` spelling used in report titles.
const SEPARATORS: &[char] = &['/', '.', '_', '年', '月'];

static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(20\d{2})[-./_年]?(\d{1,2})[-./_月]?(\d{1,2})")
    .expect("date pattern compiles")
});

/// Find a business date in `text`.
///
/// A strict `YYYY-MM-DD` reading (after folding `/`, `.` and `_` to `-`) is
/// tried first; otherwise the first digit group anchored on a `20YY` year
/// that forms a valid calendar date wins.
pub fn normalize(text: &str) -> Option<NaiveDate> {
  let trimmed = text.trim();
  if trimmed.is_empty() {
    return None;
  }

  let folded: String = trimmed
    .chars()
    .map(|c| if SEPARATORS.contains(&c) { '-' } else { c })
    .collect();
  if let Ok(date) = NaiveDate::parse_from_str(&folded, "%Y-%m-%d") {
    return Some(date);
  }

  DATE_PATTERN.captures_iter(trimmed).find_map(|caps| {
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn iso_form_passes_through() {
    assert_eq!(normalize("2024-01-05"), Some(ymd(2024, 1, 5)));
    assert_eq!(normalize(" 2024-01-05 "), Some(ymd(2024, 1, 5)));
  }

  #[test]
  fn every_separator_style_lands_on_the_same_date() {
    for raw in [
      "2024-01-05",
      "2024/01/05",
      "2024.01.05",
      "2024_01_05",
      "20240105",
      "2024/1/5",
      "2024年01月05日",
    ] {
      assert_eq!(normalize(raw), Some(ymd(2024, 1, 5)), "input {raw:?}");
    }
  }

  #[test]
  fn finds_date_inside_filename() {
    assert_eq!(normalize("贷款日报_20240105.xlsx"), Some(ymd(2024, 1, 5)));
    assert_eq!(normalize("branch loans 2023.12.31 final.xls"), Some(ymd(2023, 12, 31)));
  }

  #[test]
  fn skips_impossible_dates_and_keeps_looking() {
    assert_eq!(normalize("v2099-13-45 then 2024-02-29"), Some(ymd(2024, 2, 29)));
    assert_eq!(normalize("2023-02-29"), None);
  }

  #[test]
  fn no_date_is_none_not_error() {
    assert_eq!(normalize(""), None);
    assert_eq!(normalize("   "), None);
    assert_eq!(normalize("loan report.xlsx"), None);
    assert_eq!(normalize("19990105"), None);
  }
}
