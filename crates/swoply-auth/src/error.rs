//! Error type for `swoply-auth`.

use swoply_core::form::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
  /// No account is registered under the given email.
  #[error("account not found")]
  AccountNotFound,

  /// The account exists but the credential does not match.
  #[error("wrong password")]
  WrongCredential,

  #[error("an account with this email already exists")]
  EmailTaken,

  #[error("not logged in")]
  NotAuthenticated,

  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error("password hashing error: {0}")]
  Hash(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl AuthError {
  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = AuthError> = std::result::Result<T, E>;
