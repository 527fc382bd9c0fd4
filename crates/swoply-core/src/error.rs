//! Error types for `swoply-core`.
//!
//! Form validation has its own error, [`crate::form::ValidationError`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("price must be a positive finite number, got {0}")]
  InvalidPrice(f64),

  #[error("price is not a number: {0:?}")]
  UnparsablePrice(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
