//! Error type for `tally-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// An id does not fit the column or domain integer type.
  #[error("id out of range: {0}")]
  IdOutOfRange(String),

  /// A `votes.action` value outside `{-1, 1}`.
  #[error("unknown vote action in ledger: {0}")]
  UnknownVoteAction(i64),

  #[error("identity not found: {0}")]
  IdentityNotFound(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
