//! Error types for `trendhub-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown scope code: {0:?}")]
  UnknownScope(String),

  #[error("unknown metric kind: {0:?}")]
  UnknownMetricKind(String),

  #[error("invalid date window: {start} is after {end}")]
  InvertedPeriod {
    start: chrono::NaiveDate,
    end:   chrono::NaiveDate,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
