//! Error type for `swoply-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  /// A stored collection or session pointer could not be (de)serialised.
  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),
}

impl From<tokio_rusqlite::Error> for Error {
  /// JSON failures raised inside a connection closure travel as
  /// `tokio_rusqlite::Error::Other`; unwrap them back into [`Error::Json`].
  fn from(e: tokio_rusqlite::Error) -> Self {
    match e {
      tokio_rusqlite::Error::Other(inner) => {
        match inner.downcast::<serde_json::Error>() {
          Ok(json) => Self::Json(*json),
          Err(other) => Self::Database(tokio_rusqlite::Error::Other(other)),
        }
      }
      other => Self::Database(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
