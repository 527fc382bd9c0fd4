//! Messages exchanged between a buyer and a seller about a listing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
  #[serde(rename = "id")]
  pub message_id:  Uuid,
  pub listing_id:  Uuid,
  pub sender_id:   Uuid,
  pub receiver_id: Uuid,
  pub content:     String,
  #[serde(rename = "timestamp")]
  pub sent_at:     DateTime<Utc>,
  pub read:        bool,
}

impl Message {
  /// Whether `account_id` takes part in this message.
  pub fn involves(&self, account_id: Uuid) -> bool {
    self.sender_id == account_id || self.receiver_id == account_id
  }
}

/// Input to [`crate::store::MarketStore::create_message`].
/// Identifier and timestamp are set by the store.
#[derive(Debug, Clone)]
pub struct NewMessage {
  pub listing_id:  Uuid,
  pub sender_id:   Uuid,
  pub receiver_id: Uuid,
  pub content:     String,
  pub read:        bool,
}

impl NewMessage {
  /// An unread message.
  pub fn new(
    listing_id: Uuid,
    sender_id: Uuid,
    receiver_id: Uuid,
    content: impl Into<String>,
  ) -> Self {
    Self {
      listing_id,
      sender_id,
      receiver_id,
      content: content.into(),
      read: false,
    }
  }
}
