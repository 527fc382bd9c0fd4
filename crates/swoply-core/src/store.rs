//! The `MarketStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `swoply-store-sqlite`).
//! Higher layers (`swoply-auth`, `swoply-cli`) depend on this abstraction, not
//! on any concrete backend.
//!
//! Lookup misses are not errors: a missing record comes back as `None` (or
//! `false`), and callers are expected to check. `Self::Error` is reserved for
//! storage failures.

use std::future::Future;

use uuid::Uuid;

use crate::{
  account::{Account, AccountPatch, NewAccount},
  listing::{Category, Listing, ListingPatch, ListingQuery, NewListing},
  message::{Message, NewMessage},
  session::SessionPointer,
};

/// Abstraction over a Swoply marketplace backend.
///
/// Every collection is read and written as a whole. A backend must make each
/// read-modify-write method atomic with respect to other callers.
pub trait MarketStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Accounts ──────────────────────────────────────────────────────────

  fn list_accounts(
    &self,
  ) -> impl Future<Output = Result<Vec<Account>, Self::Error>> + Send + '_;

  fn get_account(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  /// Exact, case-sensitive email lookup.
  fn get_account_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + 'a;

  /// Persist a new account. Returns `None` if the email is already
  /// registered; the check and the insert are a single atomic step.
  fn create_account(
    &self,
    input: NewAccount,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  /// Merge `patch` into the account. Returns `None` if `id` is unknown.
  fn update_account(
    &self,
    id: Uuid,
    patch: AccountPatch,
  ) -> impl Future<Output = Result<Option<Account>, Self::Error>> + Send + '_;

  // ── Listings ──────────────────────────────────────────────────────────

  fn list_listings(
    &self,
  ) -> impl Future<Output = Result<Vec<Listing>, Self::Error>> + Send + '_;

  fn get_listing(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Listing>, Self::Error>> + Send + '_;

  /// All listings owned by `account_id`, whatever their status.
  fn listings_by_account(
    &self,
    account_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Listing>, Self::Error>> + Send + '_;

  /// Active listings in `category`.
  fn listings_by_category(
    &self,
    category: Category,
  ) -> impl Future<Output = Result<Vec<Listing>, Self::Error>> + Send + '_;

  /// Active listings matching `query`, newest first. Unbounded.
  fn search_listings<'a>(
    &'a self,
    query: &'a ListingQuery,
  ) -> impl Future<Output = Result<Vec<Listing>, Self::Error>> + Send + 'a;

  fn create_listing(
    &self,
    input: NewListing,
  ) -> impl Future<Output = Result<Listing, Self::Error>> + Send + '_;

  /// Merge `patch` into the listing and stamp `updated_at`. Returns `None` if
  /// `id` is unknown.
  fn update_listing(
    &self,
    id: Uuid,
    patch: ListingPatch,
  ) -> impl Future<Output = Result<Option<Listing>, Self::Error>> + Send + '_;

  /// Remove the listing. Messages and favorites are left untouched. Returns
  /// `false` if `id` is unknown.
  fn delete_listing(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Bump the view counter by one. Returns `None` if `id` is unknown.
  fn increment_views(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Listing>, Self::Error>> + Send + '_;

  /// Add or remove `account_id` from the listing's favorites.
  ///
  /// `Some(true)` if the account was added, `Some(false)` if it was removed,
  /// `None` if the listing is unknown.
  fn toggle_favorite(
    &self,
    listing_id: Uuid,
    account_id: Uuid,
  ) -> impl Future<Output = Result<Option<bool>, Self::Error>> + Send + '_;

  // ── Messages ──────────────────────────────────────────────────────────

  fn list_messages(
    &self,
  ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + '_;

  /// Messages about one listing, oldest first.
  fn messages_for_listing(
    &self,
    listing_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + '_;

  /// Every message sent or received by `account_id`, in stored order.
  fn conversations(
    &self,
    account_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Message>, Self::Error>> + Send + '_;

  fn create_message(
    &self,
    input: NewMessage,
  ) -> impl Future<Output = Result<Message, Self::Error>> + Send + '_;

  /// Set the read flag. Returns `None` if `id` is unknown.
  fn mark_message_read(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Message>, Self::Error>> + Send + '_;

  // ── Session pointer ───────────────────────────────────────────────────

  fn load_session(
    &self,
  ) -> impl Future<Output = Result<Option<SessionPointer>, Self::Error>> + Send + '_;

  fn save_session(
    &self,
    pointer: SessionPointer,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn clear_session(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
