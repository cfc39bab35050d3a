//! Parser for the branch loan-statistics report family.
//!
//! Turns one worksheet into normalised [`trendhub_core::Fact`] records. There
//! is no fixed schema: the business date, header depth, branch-name column,
//! metric columns, and face-value / adjusted split are all inferred. Pure
//! synchronous; no HTTP or database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! use trendhub_sheet::{CellGrid, business_date, parse_sheet};
//!
//! let bytes = std::fs::read("贷款日报_20240105.xlsx").unwrap();
//! let grid = CellGrid::from_workbook_bytes(&bytes).unwrap();
//! let (date, _) = business_date("贷款日报_20240105.xlsx", &grid).unwrap();
//! let parsed = parse_sheet(&grid, date, "贷款日报_20240105.xlsx").unwrap();
//! println!("{} facts, layout {:?}", parsed.facts.len(), parsed.layout);
//! ```

pub mod detect;
pub mod error;
pub mod grid;
pub mod metric;
pub mod parse;

pub use detect::SheetLayout;
pub use error::{Error, Result};
pub use grid::{Cell, CellGrid};
pub use parse::{DateSource, MetricColumn, ParsedSheet, business_date, parse_sheet};
