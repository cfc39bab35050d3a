//! Upload batch → one keyed upsert.
//!
//! Files are processed in order. A file without a business date is skipped
//! with a message; any other per-file failure aborts the whole batch before
//! anything is written, since the upsert happens once over the union of every
//! file's facts.

use serde::Serialize;
use tracing::{debug, info, warn};
use trendhub_core::{Fact, fact::dedup_last_write_wins, store::FactStore};
use trendhub_sheet::{CellGrid, ParsedSheet, business_date, parse_sheet};

use crate::error::{Error, IngestFailure, Result};

/// Name used for an upload that arrived without a file name.
pub const UNNAMED_FILE: &str = "unknown.xlsx";

/// One uploaded workbook.
#[derive(Debug, Clone)]
pub struct UploadedFile {
  pub name:  String,
  pub bytes: Vec<u8>,
}

impl UploadedFile {
  pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
    Self { name: name.into(), bytes: bytes.into() }
  }

  fn display_name(&self) -> &str {
    let name = self.name.trim();
    if name.is_empty() { UNNAMED_FILE } else { name }
  }
}

/// Outcome of a successful batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
  pub accepted_files: Vec<String>,
  /// Facts extracted across every accepted file.
  pub total_rows:     usize,
  /// Stored rows written after collapsing duplicate keys within the batch.
  pub saved_rows:     usize,
  pub messages:       Vec<String>,
}

/// Parse every file in `files` and upsert the combined facts into `store`.
pub async fn ingest<F>(store: &F, files: Vec<UploadedFile>) -> Result<IngestSummary>
where
  F: FactStore,
{
  let mut summary = IngestSummary::default();
  let mut facts: Vec<Fact> = Vec::new();

  for file in &files {
    if file.bytes.is_empty() {
      continue;
    }
    let name = file.display_name();

    let parsed = match parse_file(name, &file.bytes, &mut summary.messages) {
      Ok(Some(parsed)) => parsed,
      Ok(None) => continue,
      Err(source) => {
        warn!(file = %name, error = %source, "ingest aborted");
        summary.messages.push(format!("{name}: {source}"));
        return Err(Error::Ingest(IngestFailure {
          file: name.to_owned(),
          messages: summary.messages,
          source,
        }));
      }
    };

    info!(file = %name, facts = parsed.facts.len(), "file accepted");
    summary.total_rows += parsed.facts.len();
    summary.accepted_files.push(name.to_owned());
    facts.extend(parsed.facts);
  }

  let batch = dedup_last_write_wins(facts);
  if !batch.is_empty() {
    let rows = batch.len();
    summary.saved_rows = store.upsert_batch(batch).await.map_err(Error::store)?;
    info!(rows, saved = summary.saved_rows, "batch upserted");
  }

  Ok(summary)
}

/// Load and parse one workbook. `Ok(None)` means the file was skipped.
fn parse_file(
  name: &str,
  bytes: &[u8],
  messages: &mut Vec<String>,
) -> trendhub_sheet::Result<Option<ParsedSheet>> {
  let grid = CellGrid::from_workbook_bytes(bytes)?;

  let Some((date, date_source)) = business_date(name, &grid) else {
    warn!(file = %name, "no business date found, skipping");
    messages.push(format!(
      "{name}: no business date in the file name or the first rows of the sheet; skipped"
    ));
    return Ok(None);
  };
  debug!(file = %name, %date, ?date_source, "business date resolved");

  let parsed = parse_sheet(&grid, date, name)?;
  debug!(file = %name, layout = ?parsed.layout, "layout detected");

  if parsed.layout.needs_review() {
    warn!(
      file = %name,
      boundary = parsed.layout.scope_boundary,
      "no adjusted-scope keyword, split at column midpoint"
    );
    messages.push(format!(
      "{name}: no adjusted-scope keyword in the header; columns {} and later were \
       classified ADJ by midpoint, please review",
      parsed.layout.scope_boundary
    ));
  }
  messages.push(format!(
    "{name}: {} facts dated {date} (header depth {}, branch column {}, {} metric columns)",
    parsed.facts.len(),
    parsed.layout.header_depth,
    parsed.layout.branch_column,
    parsed.metric_columns.len(),
  ));

  Ok(Some(parsed))
}
