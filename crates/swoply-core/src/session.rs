//! The persisted session pointer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which account was logged in, and when. Stored apart from the account
/// records; it only becomes a live identity if the account still resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPointer {
  #[serde(rename = "userId")]
  pub account_id: Uuid,
  pub timestamp:  DateTime<Utc>,
}

impl SessionPointer {
  pub fn now(account_id: Uuid) -> Self {
    Self { account_id, timestamp: Utc::now() }
  }
}
