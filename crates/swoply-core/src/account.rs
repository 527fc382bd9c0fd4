//! Accounts: the registered users of the marketplace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Rating assigned to every freshly created account.
pub const DEFAULT_RATING: f64 = 5.0;

/// A registered account, as persisted under the accounts key.
///
/// Field names follow the stored camelCase layout so that collections written
/// by earlier versions of the storefront remain readable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
  #[serde(rename = "id")]
  pub account_id:      Uuid,
  /// Unique, compared case-sensitively exactly as stored.
  pub email:           String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub phone:           Option<String>,
  /// Credential digest: either a legacy rolling checksum or an Argon2 PHC
  /// string.
  #[serde(rename = "password")]
  pub credential_hash: String,
  pub name:            String,
  pub verified:        bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub avatar:          Option<String>,
  pub created_at:      DateTime<Utc>,
  pub rating:          f64,
  pub reviews_count:   u32,
}

/// Input to [`crate::store::MarketStore::create_account`].
/// Identifier, creation time, rating and review count are set by the store.
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub email:           String,
  pub phone:           Option<String>,
  pub credential_hash: String,
  pub name:            String,
  pub verified:        bool,
  pub avatar:          Option<String>,
}

/// A partial update merged into a stored [`Account`].
///
/// `None` leaves a field untouched. For optional fields, `Some(None)` clears
/// the stored value. The email is not patchable: changing it would bypass the
/// uniqueness check performed at creation.
#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
  pub name:            Option<String>,
  pub phone:           Option<Option<String>>,
  pub avatar:          Option<Option<String>>,
  pub verified:        Option<bool>,
  pub rating:          Option<f64>,
  pub reviews_count:   Option<u32>,
  pub credential_hash: Option<String>,
}

impl AccountPatch {
  pub fn is_empty(&self) -> bool {
    self.name.is_none()
      && self.phone.is_none()
      && self.avatar.is_none()
      && self.verified.is_none()
      && self.rating.is_none()
      && self.reviews_count.is_none()
      && self.credential_hash.is_none()
  }

  /// Merge this patch into `account`.
  pub fn apply(self, account: &mut Account) {
    if let Some(name) = self.name {
      account.name = name;
    }
    if let Some(phone) = self.phone {
      account.phone = phone;
    }
    if let Some(avatar) = self.avatar {
      account.avatar = avatar;
    }
    if let Some(verified) = self.verified {
      account.verified = verified;
    }
    if let Some(rating) = self.rating {
      account.rating = rating;
    }
    if let Some(reviews_count) = self.reviews_count {
      account.reviews_count = reviews_count;
    }
    if let Some(hash) = self.credential_hash {
      account.credential_hash = hash;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn account() -> Account {
    Account {
      account_id:      Uuid::new_v4(),
      email:           "anna@example.com".into(),
      phone:           Some("+7 900 000 00 00".into()),
      credential_hash: "96354".into(),
      name:            "Анна К.".into(),
      verified:        false,
      avatar:          None,
      created_at:      Utc::now(),
      rating:          DEFAULT_RATING,
      reviews_count:   0,
    }
  }

  #[test]
  fn patch_merges_only_set_fields() {
    let mut a = account();
    let before = a.clone();

    AccountPatch {
      name: Some("Anna K.".into()),
      phone: Some(None),
      ..Default::default()
    }
    .apply(&mut a);

    assert_eq!(a.name, "Anna K.");
    assert_eq!(a.phone, None);
    assert_eq!(a.email, before.email);
    assert_eq!(a.credential_hash, before.credential_hash);
    assert_eq!(a.rating, before.rating);
  }

  #[test]
  fn empty_patch_is_empty() {
    assert!(AccountPatch::default().is_empty());
    assert!(
      !AccountPatch { verified: Some(true), ..Default::default() }.is_empty()
    );
  }

  #[test]
  fn decodes_record_written_by_browser_storefront() {
    let raw = r#"{
      "id": "3f2b8c1e-9a4d-4e7b-8c21-5d6f0a1b2c3d",
      "email": "anna@example.com",
      "password": "-1426402434",
      "name": "Анна К.",
      "verified": true,
      "createdAt": "2024-05-01T10:00:00.000Z",
      "rating": 4.8,
      "reviewsCount": 12
    }"#;

    let a: Account = serde_json::from_str(raw).unwrap();
    assert_eq!(a.phone, None);
    assert_eq!(a.avatar, None);
    assert_eq!(a.credential_hash, "-1426402434");
    assert_eq!(a.reviews_count, 12);
    assert_eq!(a.created_at.to_rfc3339(), "2024-05-01T10:00:00+00:00");
  }

  #[test]
  fn stored_layout_uses_legacy_keys() {
    let a = account();
    let json = serde_json::to_value(&a).unwrap();
    assert_eq!(json["id"], a.account_id.to_string());
    assert_eq!(json["password"], "96354");
    assert_eq!(json["reviewsCount"], 0);
    assert!(json.get("avatar").is_none());
  }
}
