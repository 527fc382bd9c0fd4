//! Session and identity service for Swoply.
//!
//! [`AuthService`] owns the current identity for one front end and keeps the
//! persisted session pointer in step with it. Credentials are checked by
//! [`CredentialHasher`].

pub mod credential;
pub mod error;
pub mod service;

pub use credential::{CredentialHasher, Verification};
pub use error::{AuthError, Result};
pub use service::{AuthService, ProfileUpdate};

#[cfg(test)]
mod tests;
