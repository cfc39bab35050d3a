//! Handler for `POST /api/upload`.

use axum::{
  Json,
  extract::{Multipart, State},
};
use bytes::Bytes;
use trendhub_core::store::{FactStore, MetricRegistry};
use trendhub_engine::{IngestSummary, UploadedFile};

use crate::{AppState, error::ApiError};

/// Multipart field carrying report workbooks; may repeat.
pub const FILES_FIELD: &str = "files";

/// `POST /api/upload` with a multipart body, one `files` part per workbook.
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  mut multipart: Multipart,
) -> Result<Json<IngestSummary>, ApiError>
where
  S: FactStore + MetricRegistry,
{
  let mut files = Vec::new();
  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| ApiError::BadRequest(e.to_string()))?
  {
    if field.name() != Some(FILES_FIELD) {
      continue;
    }
    let name = field.file_name().unwrap_or_default().to_owned();
    let data: Bytes = field
      .bytes()
      .await
      .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    files.push(UploadedFile::new(name, data.to_vec()));
  }

  let received = files.len();
  let summary = trendhub_engine::ingest(&*state.store, files).await?;
  tracing::info!(
    received,
    accepted = summary.accepted_files.len(),
    saved = summary.saved_rows,
    "upload ingested"
  );
  Ok(Json(summary))
}
