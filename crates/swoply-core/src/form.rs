//! User-facing forms and their validation.
//!
//! Forms hold raw text exactly as entered. Validation runs before any store
//! call and produces the typed inputs the store accepts, so a listing with a
//! missing field or a non-positive price never reaches a backend.

use thiserror::Error;
use uuid::Uuid;

use crate::listing::{Category, Condition, ListingStatus, NewListing, Price};

/// Minimum number of characters accepted for a new credential.
pub const MIN_CREDENTIAL_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("required fields are empty: {}", .0.join(", "))]
  MissingFields(Vec<&'static str>),

  #[error("price must be a positive number, got {0:?}")]
  InvalidPrice(String),

  #[error("unknown category: {0:?}")]
  UnknownCategory(String),

  #[error("unknown condition: {0:?}")]
  UnknownCondition(String),

  #[error("password must be at least {min} characters long")]
  CredentialTooShort { min: usize },
}

// ─── Listing form ────────────────────────────────────────────────────────────

/// The listing-creation form.
#[derive(Debug, Clone, Default)]
pub struct ListingForm {
  pub title:       String,
  pub description: String,
  pub price:       String,
  /// Category key, e.g. `electronics`.
  pub category:    String,
  /// Condition key, e.g. `good`.
  pub condition:   String,
  pub location:    String,
  /// Comma-separated; blank entries are dropped.
  pub tags:        String,
  /// Optional single image reference.
  pub image_url:   String,
}

impl ListingForm {
  /// Validate the form and build an active [`NewListing`] owned by
  /// `account_id`.
  pub fn validate(&self, account_id: Uuid) -> Result<NewListing, ValidationError> {
    let title = self.title.trim();
    let description = self.description.trim();
    let price = self.price.trim();
    let category = self.category.trim();
    let condition = self.condition.trim();
    let location = self.location.trim();

    let missing: Vec<&'static str> = [
      ("title", title),
      ("description", description),
      ("price", price),
      ("category", category),
      ("condition", condition),
      ("location", location),
    ]
    .into_iter()
    .filter(|(_, v)| v.is_empty())
    .map(|(name, _)| name)
    .collect();

    if !missing.is_empty() {
      return Err(ValidationError::MissingFields(missing));
    }

    let price: Price = price
      .parse()
      .map_err(|_| ValidationError::InvalidPrice(price.to_owned()))?;
    let category: Category = category
      .parse()
      .map_err(|_| ValidationError::UnknownCategory(category.to_owned()))?;
    let condition: Condition = condition
      .parse()
      .map_err(|_| ValidationError::UnknownCondition(condition.to_owned()))?;

    let image = self.image_url.trim();

    Ok(NewListing {
      account_id,
      title: title.to_owned(),
      description: description.to_owned(),
      price,
      category,
      condition,
      images: if image.is_empty() { vec![] } else { vec![image.to_owned()] },
      location: location.to_owned(),
      tags: split_tags(&self.tags),
      status: ListingStatus::Active,
    })
  }
}

/// Split a comma-separated tag list, trimming entries and dropping blanks.
pub fn split_tags(raw: &str) -> Vec<String> {
  raw
    .split(',')
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .map(str::to_owned)
    .collect()
}

// ─── Registration form ───────────────────────────────────────────────────────

/// The sign-up form.
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
  pub email:    String,
  pub password: String,
  pub name:     String,
  pub phone:    Option<String>,
}

impl RegistrationForm {
  pub fn validate(&self) -> Result<(), ValidationError> {
    let missing: Vec<&'static str> = [
      ("email", self.email.trim()),
      ("password", self.password.as_str()),
      ("name", self.name.trim()),
    ]
    .into_iter()
    .filter(|(_, v)| v.is_empty())
    .map(|(name, _)| name)
    .collect();

    if !missing.is_empty() {
      return Err(ValidationError::MissingFields(missing));
    }

    if self.password.chars().count() < MIN_CREDENTIAL_LEN {
      return Err(ValidationError::CredentialTooShort { min: MIN_CREDENTIAL_LEN });
    }

    Ok(())
  }

  /// The phone number, if one was entered.
  pub fn phone(&self) -> Option<String> {
    self
      .phone
      .as_deref()
      .map(str::trim)
      .filter(|p| !p.is_empty())
      .map(str::to_owned)
  }
}
