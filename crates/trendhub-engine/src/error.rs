//! Error types for ingestion and aggregation.

use thiserror::Error;

/// A storage backend error, type-erased so the engine stays generic over
/// [`trendhub_core::store::FactStore`] implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Ingest(#[from] IngestFailure),

  #[error("store error: {0}")]
  Store(#[source] BoxError),
}

impl Error {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Error::Store(Box::new(e))
  }
}

/// One file of an upload batch could not be processed. Nothing from the batch
/// was stored.
#[derive(Debug, Error)]
#[error("failed to ingest {file}: {source}")]
pub struct IngestFailure {
  pub file:     String,
  /// Every diagnostic accumulated up to and including the failing file.
  pub messages: Vec<String>,
  #[source]
  pub source:   trendhub_sheet::Error,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
