//! Credential digests.
//!
//! New credentials are stored as Argon2id PHC strings. Accounts written by the
//! browser storefront carry a 32-bit rolling checksum instead; those are
//! still accepted so that existing users can log in, and are upgraded on their
//! next successful login.

use argon2::{
  Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier,
  Version, password_hash::SaltString,
};
use rand_core::OsRng;

use crate::{AuthError, Result};

/// Outcome of checking a credential against a stored digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
  Match,
  /// Matched a legacy checksum; the stored digest should be replaced.
  LegacyMatch,
  Mismatch,
}

/// The legacy checksum: `h = h * 31 + unit` over UTF-16 code
/// units, wrapping at 32 bits, rendered as a signed decimal.
///
/// Not a password hash. Only used to recognise legacy records.
pub fn legacy_checksum(credential: &str) -> String {
  credential
    .encode_utf16()
    .fold(0i32, |h, unit| {
      h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit))
    })
    .to_string()
}

/// Hashes and verifies credentials with Argon2id.
#[derive(Debug, Clone, Default)]
pub struct CredentialHasher {
  params: Params,
}

impl CredentialHasher {
  pub fn new(params: Params) -> Self { Self { params } }

  /// Build a hasher from raw cost parameters.
  pub fn with_costs(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self> {
    let params = Params::new(memory_kib, iterations, parallelism, None)
      .map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(Self::new(params))
  }

  fn argon2(&self) -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
  }

  /// Produce a salted PHC string for `credential`.
  pub fn hash(&self, credential: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = self
      .argon2()
      .hash_password(credential.as_bytes(), &salt)
      .map_err(|e| AuthError::Hash(e.to_string()))?;
    Ok(hash.to_string())
  }

  /// Check `credential` against a stored digest of either scheme.
  pub fn verify(&self, credential: &str, stored: &str) -> Result<Verification> {
    if !stored.starts_with('$') {
      return Ok(if legacy_checksum(credential) == stored {
        Verification::LegacyMatch
      } else {
        Verification::Mismatch
      });
    }

    let parsed = PasswordHash::new(stored).map_err(|e| AuthError::Hash(e.to_string()))?;
    match self.argon2().verify_password(credential.as_bytes(), &parsed) {
      Ok(()) => Ok(Verification::Match),
      Err(argon2::password_hash::Error::Password) => Ok(Verification::Mismatch),
      Err(e) => Err(AuthError::Hash(e.to_string())),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn hasher() -> CredentialHasher {
    CredentialHasher::with_costs(8, 1, 1).unwrap()
  }

  #[test]
  fn legacy_checksum_known_values() {
    assert_eq!(legacy_checksum(""), "0");
    assert_eq!(legacy_checksum("a"), "97");
    assert_eq!(legacy_checksum("abc"), "96354");
    assert_eq!(legacy_checksum("hello"), "99162322");
  }

  #[test]
  fn legacy_checksum_wraps_at_32_bits() {
    // 31^7 * 'a' already exceeds i32::MAX.
    let sum = legacy_checksum("aaaaaaaa");
    assert!(sum.parse::<i32>().is_ok());
    assert_eq!(legacy_checksum("polygenelubricants"), "-2147483648");
  }

  #[test]
  fn legacy_checksum_uses_utf16_units() {
    // 'П' is U+041F (1055), a single UTF-16 unit.
    assert_eq!(legacy_checksum("П"), "1055");
  }

  #[test]
  fn argon2_hash_verifies() {
    let h = hasher();
    let stored = h.hash("correct horse").unwrap();
    assert!(stored.starts_with("$argon2id$"));
    assert_eq!(h.verify("correct horse", &stored).unwrap(), Verification::Match);
    assert_eq!(h.verify("wrong horse", &stored).unwrap(), Verification::Mismatch);
  }

  #[test]
  fn legacy_digest_verifies() {
    let h = hasher();
    let stored = legacy_checksum("secret1");
    assert_eq!(h.verify("secret1", &stored).unwrap(), Verification::LegacyMatch);
    assert_eq!(h.verify("secret2", &stored).unwrap(), Verification::Mismatch);
  }

  #[test]
  fn malformed_phc_string_is_an_error() {
    assert!(matches!(
      hasher().verify("x", "$not-a-phc"),
      Err(AuthError::Hash(_))
    ));
  }

  #[test]
  fn invalid_costs_are_rejected() {
    assert!(CredentialHasher::with_costs(0, 0, 0).is_err());
  }
}
