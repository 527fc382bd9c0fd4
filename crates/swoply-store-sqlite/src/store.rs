//! The SQLite implementation of [`MarketStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::TransactionBehavior;
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;
use uuid::Uuid;

use swoply_core::{
  account::{Account, AccountPatch, DEFAULT_RATING, NewAccount},
  listing::{Category, Listing, ListingPatch, ListingQuery, NewListing, sort_newest_first},
  message::{Message, NewMessage},
  session::SessionPointer,
  store::MarketStore,
};

use crate::{
  Result,
  kv::{self, ACCOUNTS_KEY, LISTINGS_KEY, MESSAGES_KEY, SESSION_KEY},
  schema::SCHEMA,
};

/// What a read-modify-write closure decided to do with the collection.
enum Change<R> {
  /// The collection was modified; write it back.
  Write(R),
  /// Nothing changed; skip the write.
  Keep(R),
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Swoply store backed by a single SQLite file.
///
/// Cloning shares the underlying connection.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Deserialise the whole collection stored under `key`.
  async fn read_all<T>(&self, key: &'static str) -> Result<Vec<T>>
  where
    T: DeserializeOwned + Send + 'static,
  {
    let records = self
      .conn
      .call(move |conn| {
        let raw = kv::get_item(conn, key)?;
        kv::decode_collection(raw.as_deref()).map_err(kv::json_error)
      })
      .await?;
    Ok(records)
  }

  /// Read the collection under `key`, hand it to `f`, and write it back if
  /// `f` changed it, inside one immediate transaction so concurrent
  /// writers queue instead of overwriting each other.
  async fn modify<T, R, F>(&self, key: &'static str, f: F) -> Result<R>
  where
    T: Serialize + DeserializeOwned + Send + 'static,
    R: Send + 'static,
    F: FnOnce(&mut Vec<T>) -> Change<R> + Send + 'static,
  {
    let out = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let raw = kv::get_item(&tx, key)?;
        let mut records: Vec<T> =
          kv::decode_collection(raw.as_deref()).map_err(kv::json_error)?;

        let out = match f(&mut records) {
          Change::Write(out) => {
            let encoded = kv::encode_collection(&records).map_err(kv::json_error)?;
            kv::set_item(&tx, key, &encoded)?;
            out
          }
          Change::Keep(out) => out,
        };

        tx.commit()?;
        Ok(out)
      })
      .await?;
    Ok(out)
  }
}

// ─── MarketStore impl ────────────────────────────────────────────────────────

impl MarketStore for SqliteStore {
  type Error = crate::Error;

  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn list_accounts(&self) -> Result<Vec<Account>> {
    self.read_all(ACCOUNTS_KEY).await
  }

  async fn get_account(&self, id: Uuid) -> Result<Option<Account>> {
    let accounts: Vec<Account> = self.read_all(ACCOUNTS_KEY).await?;
    Ok(accounts.into_iter().find(|a| a.account_id == id))
  }

  async fn get_account_by_email(&self, email: &str) -> Result<Option<Account>> {
    let accounts: Vec<Account> = self.read_all(ACCOUNTS_KEY).await?;
    Ok(accounts.into_iter().find(|a| a.email == email))
  }

  async fn create_account(&self, input: NewAccount) -> Result<Option<Account>> {
    let account = Account {
      account_id:      Uuid::new_v4(),
      email:           input.email,
      phone:           input.phone,
      credential_hash: input.credential_hash,
      name:            input.name,
      verified:        input.verified,
      avatar:          input.avatar,
      created_at:      Utc::now(),
      rating:          DEFAULT_RATING,
      reviews_count:   0,
    };

    let created = self
      .modify(ACCOUNTS_KEY, move |accounts: &mut Vec<Account>| {
        if accounts.iter().any(|a| a.email == account.email) {
          return Change::Keep(None);
        }
        accounts.push(account.clone());
        Change::Write(Some(account))
      })
      .await?;

    match &created {
      Some(a) => debug!(account_id = %a.account_id, "account created"),
      None => debug!("account not created: email already registered"),
    }
    Ok(created)
  }

  async fn update_account(
    &self,
    id:    Uuid,
    patch: AccountPatch,
  ) -> Result<Option<Account>> {
    let updated = self
      .modify(ACCOUNTS_KEY, move |accounts: &mut Vec<Account>| {
        match accounts.iter_mut().find(|a| a.account_id == id) {
          Some(account) => {
            patch.apply(account);
            Change::Write(Some(account.clone()))
          }
          None => Change::Keep(None),
        }
      })
      .await?;

    if updated.is_some() {
      debug!(account_id = %id, "account updated");
    }
    Ok(updated)
  }

  // ── Listings ──────────────────────────────────────────────────────────────

  async fn list_listings(&self) -> Result<Vec<Listing>> {
    self.read_all(LISTINGS_KEY).await
  }

  async fn get_listing(&self, id: Uuid) -> Result<Option<Listing>> {
    let listings: Vec<Listing> = self.read_all(LISTINGS_KEY).await?;
    Ok(listings.into_iter().find(|l| l.listing_id == id))
  }

  async fn listings_by_account(&self, account_id: Uuid) -> Result<Vec<Listing>> {
    let mut listings: Vec<Listing> = self.read_all(LISTINGS_KEY).await?;
    listings.retain(|l| l.account_id == account_id);
    Ok(listings)
  }

  async fn listings_by_category(&self, category: Category) -> Result<Vec<Listing>> {
    let mut listings: Vec<Listing> = self.read_all(LISTINGS_KEY).await?;
    listings.retain(|l| l.category == category && l.is_active());
    Ok(listings)
  }

  async fn search_listings(&self, query: &ListingQuery) -> Result<Vec<Listing>> {
    let mut listings: Vec<Listing> = self.read_all(LISTINGS_KEY).await?;
    listings.retain(|l| query.matches(l));
    sort_newest_first(&mut listings);
    Ok(listings)
  }

  async fn create_listing(&self, input: NewListing) -> Result<Listing> {
    let now = Utc::now();
    let listing = Listing {
      listing_id:  Uuid::new_v4(),
      account_id:  input.account_id,
      title:       input.title,
      description: input.description,
      price:       input.price,
      category:    input.category,
      condition:   input.condition,
      images:      input.images,
      location:    input.location,
      tags:        input.tags,
      status:      input.status,
      views:       0,
      favorites:   Vec::new(),
      created_at:  now,
      updated_at:  now,
    };

    let stored = listing.clone();
    self
      .modify(LISTINGS_KEY, move |listings: &mut Vec<Listing>| {
        listings.push(stored);
        Change::Write(())
      })
      .await?;

    debug!(listing_id = %listing.listing_id, "listing created");
    Ok(listing)
  }

  async fn update_listing(
    &self,
    id:    Uuid,
    patch: ListingPatch,
  ) -> Result<Option<Listing>> {
    let updated = self
      .modify(LISTINGS_KEY, move |listings: &mut Vec<Listing>| {
        match listings.iter_mut().find(|l| l.listing_id == id) {
          Some(listing) => {
            patch.apply(listing, Utc::now());
            Change::Write(Some(listing.clone()))
          }
          None => Change::Keep(None),
        }
      })
      .await?;

    if updated.is_some() {
      debug!(listing_id = %id, "listing updated");
    }
    Ok(updated)
  }

  async fn delete_listing(&self, id: Uuid) -> Result<bool> {
    let deleted = self
      .modify(LISTINGS_KEY, move |listings: &mut Vec<Listing>| {
        match listings.iter().position(|l| l.listing_id == id) {
          Some(idx) => {
            listings.remove(idx);
            Change::Write(true)
          }
          None => Change::Keep(false),
        }
      })
      .await?;

    if deleted {
      debug!(listing_id = %id, "listing deleted");
    }
    Ok(deleted)
  }

  async fn increment_views(&self, id: Uuid) -> Result<Option<Listing>> {
    self
      .modify(LISTINGS_KEY, move |listings: &mut Vec<Listing>| {
        match listings.iter_mut().find(|l| l.listing_id == id) {
          Some(listing) => {
            let patch = ListingPatch {
              views: Some(listing.views + 1),
              ..Default::default()
            };
            patch.apply(listing, Utc::now());
            Change::Write(Some(listing.clone()))
          }
          None => Change::Keep(None),
        }
      })
      .await
  }

  async fn toggle_favorite(
    &self,
    listing_id: Uuid,
    account_id: Uuid,
  ) -> Result<Option<bool>> {
    let added = self
      .modify(LISTINGS_KEY, move |listings: &mut Vec<Listing>| {
        match listings.iter_mut().find(|l| l.listing_id == listing_id) {
          Some(listing) => {
            let added = listing.toggle_favorite(account_id);
            listing.updated_at = Utc::now();
            Change::Write(Some(added))
          }
          None => Change::Keep(None),
        }
      })
      .await?;

    if let Some(added) = added {
      debug!(%listing_id, %account_id, added, "favorite toggled");
    }
    Ok(added)
  }

  // ── Messages ──────────────────────────────────────────────────────────────

  async fn list_messages(&self) -> Result<Vec<Message>> {
    self.read_all(MESSAGES_KEY).await
  }

  async fn messages_for_listing(&self, listing_id: Uuid) -> Result<Vec<Message>> {
    let mut messages: Vec<Message> = self.read_all(MESSAGES_KEY).await?;
    messages.retain(|m| m.listing_id == listing_id);
    messages.sort_by(|a, b| a.sent_at.cmp(&b.sent_at));
    Ok(messages)
  }

  async fn conversations(&self, account_id: Uuid) -> Result<Vec<Message>> {
    let mut messages: Vec<Message> = self.read_all(MESSAGES_KEY).await?;
    messages.retain(|m| m.involves(account_id));
    Ok(messages)
  }

  async fn create_message(&self, input: NewMessage) -> Result<Message> {
    let message = Message {
      message_id:  Uuid::new_v4(),
      listing_id:  input.listing_id,
      sender_id:   input.sender_id,
      receiver_id: input.receiver_id,
      content:     input.content,
      sent_at:     Utc::now(),
      read:        input.read,
    };

    let stored = message.clone();
    self
      .modify(MESSAGES_KEY, move |messages: &mut Vec<Message>| {
        messages.push(stored);
        Change::Write(())
      })
      .await?;

    debug!(message_id = %message.message_id, listing_id = %message.listing_id, "message created");
    Ok(message)
  }

  async fn mark_message_read(&self, id: Uuid) -> Result<Option<Message>> {
    self
      .modify(MESSAGES_KEY, move |messages: &mut Vec<Message>| {
        match messages.iter_mut().find(|m| m.message_id == id) {
          Some(message) if message.read => Change::Keep(Some(message.clone())),
          Some(message) => {
            message.read = true;
            Change::Write(Some(message.clone()))
          }
          None => Change::Keep(None),
        }
      })
      .await
  }

  // ── Session pointer ───────────────────────────────────────────────────────

  async fn load_session(&self) -> Result<Option<SessionPointer>> {
    let raw = self
      .conn
      .call(|conn| Ok(kv::get_item(conn, SESSION_KEY)?))
      .await?;

    Ok(raw
      .as_deref()
      .map(serde_json::from_str::<SessionPointer>)
      .transpose()?)
  }

  async fn save_session(&self, pointer: SessionPointer) -> Result<()> {
    let encoded = serde_json::to_string(&pointer)?;
    self
      .conn
      .call(move |conn| Ok(kv::set_item(conn, SESSION_KEY, &encoded)?))
      .await?;
    debug!(account_id = %pointer.account_id, "session saved");
    Ok(())
  }

  async fn clear_session(&self) -> Result<()> {
    self
      .conn
      .call(|conn| Ok(kv::remove_item(conn, SESSION_KEY)?))
      .await?;
    debug!("session cleared");
    Ok(())
  }
}
