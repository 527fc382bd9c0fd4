//! Listings and the queries run over them.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Enumerations ────────────────────────────────────────────────────────────

/// Catalogue category of a listing.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Category {
  Electronics,
  Clothing,
  Home,
  Transport,
  Sports,
  Books,
  Beauty,
  Toys,
  Services,
  Other,
}

impl Category {
  /// Storefront label shown to users.
  pub fn label(self) -> &'static str {
    match self {
      Self::Electronics => "Электроника",
      Self::Clothing => "Одежда",
      Self::Home => "Дом и сад",
      Self::Transport => "Транспорт",
      Self::Sports => "Спорт",
      Self::Books => "Книги",
      Self::Beauty => "Красота",
      Self::Toys => "Игрушки",
      Self::Services => "Услуги",
      Self::Other => "Другое",
    }
  }
}

/// Physical condition of the item for sale.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Condition {
  New,
  Excellent,
  Good,
  Fair,
  Poor,
}

/// Lifecycle status. Only `Active` listings are visible to search.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ListingStatus {
  #[default]
  Active,
  Sold,
  Draft,
  Archived,
}

// ─── Price ───────────────────────────────────────────────────────────────────

/// A strictly positive, finite asking price.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(f64);

impl Price {
  pub fn new(value: f64) -> Result<Self> {
    if value.is_finite() && value > 0.0 {
      Ok(Self(value))
    } else {
      Err(Error::InvalidPrice(value))
    }
  }

  pub fn get(self) -> f64 { self.0 }
}

impl TryFrom<f64> for Price {
  type Error = Error;

  fn try_from(value: f64) -> Result<Self> { Self::new(value) }
}

impl From<Price> for f64 {
  fn from(p: Price) -> Self { p.0 }
}

/// Strict: the whole trimmed text must be a number, so `"100abc"` is rejected
/// rather than read as 100.
impl FromStr for Price {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    let value: f64 = s
      .trim()
      .parse()
      .map_err(|_| Error::UnparsablePrice(s.to_owned()))?;
    Self::new(value)
  }
}

impl fmt::Display for Price {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.0.fract() == 0.0 {
      write!(f, "{:.0}", self.0)
    } else {
      write!(f, "{:.2}", self.0)
    }
  }
}

// ─── Listing ─────────────────────────────────────────────────────────────────

/// A sellable item as persisted under the listings key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
  #[serde(rename = "id")]
  pub listing_id:  Uuid,
  /// Owner. Not checked against the accounts collection.
  #[serde(rename = "userId")]
  pub account_id:  Uuid,
  pub title:       String,
  pub description: String,
  pub price:       Price,
  pub category:    Category,
  pub condition:   Condition,
  pub images:      Vec<String>,
  pub location:    String,
  pub tags:        Vec<String>,
  pub status:      ListingStatus,
  pub views:       u64,
  /// Accounts that favorited this listing; each appears at most once.
  pub favorites:   Vec<Uuid>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

impl Listing {
  pub fn is_active(&self) -> bool { self.status == ListingStatus::Active }

  pub fn is_favorited_by(&self, account_id: Uuid) -> bool {
    self.favorites.contains(&account_id)
  }

  /// Add `account_id` to the favorites if absent, remove it otherwise.
  /// Returns `true` when the account was added.
  pub fn toggle_favorite(&mut self, account_id: Uuid) -> bool {
    match self.favorites.iter().position(|id| *id == account_id) {
      Some(idx) => {
        self.favorites.remove(idx);
        false
      }
      None => {
        self.favorites.push(account_id);
        true
      }
    }
  }
}

/// Input to [`crate::store::MarketStore::create_listing`].
/// Identifier, timestamps, view counter and favorites are set by the store.
#[derive(Debug, Clone)]
pub struct NewListing {
  pub account_id:  Uuid,
  pub title:       String,
  pub description: String,
  pub price:       Price,
  pub category:    Category,
  pub condition:   Condition,
  pub images:      Vec<String>,
  pub location:    String,
  pub tags:        Vec<String>,
  pub status:      ListingStatus,
}

/// A partial update merged into a stored [`Listing`]. `updated_at` is always
/// stamped by the store.
#[derive(Debug, Clone, Default)]
pub struct ListingPatch {
  pub title:       Option<String>,
  pub description: Option<String>,
  pub price:       Option<Price>,
  pub category:    Option<Category>,
  pub condition:   Option<Condition>,
  pub images:      Option<Vec<String>>,
  pub location:    Option<String>,
  pub tags:        Option<Vec<String>>,
  pub status:      Option<ListingStatus>,
  pub views:       Option<u64>,
  pub favorites:   Option<Vec<Uuid>>,
}

impl ListingPatch {
  pub fn status(status: ListingStatus) -> Self {
    Self { status: Some(status), ..Default::default() }
  }

  /// Merge this patch into `listing` and stamp `updated_at` with `now`.
  pub fn apply(self, listing: &mut Listing, now: DateTime<Utc>) {
    if let Some(v) = self.title {
      listing.title = v;
    }
    if let Some(v) = self.description {
      listing.description = v;
    }
    if let Some(v) = self.price {
      listing.price = v;
    }
    if let Some(v) = self.category {
      listing.category = v;
    }
    if let Some(v) = self.condition {
      listing.condition = v;
    }
    if let Some(v) = self.images {
      listing.images = v;
    }
    if let Some(v) = self.location {
      listing.location = v;
    }
    if let Some(v) = self.tags {
      listing.tags = v;
    }
    if let Some(v) = self.status {
      listing.status = v;
    }
    if let Some(v) = self.views {
      listing.views = v;
    }
    if let Some(v) = self.favorites {
      listing.favorites = v;
    }
    listing.updated_at = now;
  }
}

// ─── Query ───────────────────────────────────────────────────────────────────

/// Parameters for [`crate::store::MarketStore::search_listings`].
///
/// Empty strings behave like absent filters.
#[derive(Debug, Clone, Default)]
pub struct ListingQuery {
  /// Case-insensitive substring over title, description and tags.
  pub text:      Option<String>,
  pub category:  Option<Category>,
  /// Inclusive lower bound.
  pub min_price: Option<f64>,
  /// Inclusive upper bound.
  pub max_price: Option<f64>,
  /// Case-insensitive substring over the location.
  pub location:  Option<String>,
}

impl ListingQuery {
  pub fn text(text: impl Into<String>) -> Self {
    Self { text: Some(text.into()), ..Default::default() }
  }

  /// Whether `listing` belongs in the result set. Inactive listings never do.
  pub fn matches(&self, listing: &Listing) -> bool {
    if !listing.is_active() {
      return false;
    }

    if let Some(text) = non_empty(&self.text) {
      let needle = text.to_lowercase();
      let hit = listing.title.to_lowercase().contains(&needle)
        || listing.description.to_lowercase().contains(&needle)
        || listing
          .tags
          .iter()
          .any(|tag| tag.to_lowercase().contains(&needle));
      if !hit {
        return false;
      }
    }

    if let Some(category) = self.category
      && listing.category != category
    {
      return false;
    }

    let price = listing.price.get();
    if self.min_price.is_some_and(|min| price < min) {
      return false;
    }
    if self.max_price.is_some_and(|max| price > max) {
      return false;
    }

    if let Some(location) = non_empty(&self.location)
      && !listing
        .location
        .to_lowercase()
        .contains(&location.to_lowercase())
    {
      return false;
    }

    true
  }
}

fn non_empty(s: &Option<String>) -> Option<&str> {
  s.as_deref().filter(|s| !s.is_empty())
}

/// Order listings by creation time, newest first. The sort is stable, so
/// listings created at the same instant keep their stored order.
pub fn sort_newest_first(listings: &mut [Listing]) {
  listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[cfg(test)]
mod tests {
  use chrono::Duration;
  use strum::IntoEnumIterator;

  use super::*;

  fn listing(title: &str) -> Listing {
    let now = Utc::now();
    Listing {
      listing_id:  Uuid::new_v4(),
      account_id:  Uuid::new_v4(),
      title:       title.into(),
      description: "В отличном состоянии".into(),
      price:       Price::new(85_000.0).unwrap(),
      category:    Category::Electronics,
      condition:   Condition::Excellent,
      images:      vec![],
      location:    "Москва".into(),
      tags:        vec!["apple".into(), "smartphone".into()],
      status:      ListingStatus::Active,
      views:       0,
      favorites:   vec![],
      created_at:  now,
      updated_at:  now,
    }
  }

  // ─── Price ─────────────────────────────────────────────────────────────────

  #[test]
  fn price_rejects_zero_negative_and_non_finite() {
    assert!(Price::new(0.0).is_err());
    assert!(Price::new(-1.0).is_err());
    assert!(Price::new(f64::NAN).is_err());
    assert!(Price::new(f64::INFINITY).is_err());
    assert_eq!(Price::new(0.01).unwrap().get(), 0.01);
  }

  #[test]
  fn price_parses_trimmed_numbers_only() {
    assert_eq!(" 12500 ".parse::<Price>().unwrap().get(), 12_500.0);
    assert!("abc".parse::<Price>().is_err());
    assert!("0".parse::<Price>().is_err());
    assert!("".parse::<Price>().is_err());
  }

  #[test]
  fn price_rejects_trailing_garbage() {
    assert!(matches!(
      "100abc".parse::<Price>(),
      Err(Error::UnparsablePrice(s)) if s == "100abc"
    ));
  }

  #[test]
  fn decodes_record_written_by_browser_storefront() {
    let raw = r#"{
      "id": "9b2f6c1e-4a7d-4e3b-8c21-5d6f0a1b2c3d",
      "userId": "3f2b8c1e-9a4d-4e7b-8c21-5d6f0a1b2c3d",
      "title": "iPhone 14 Pro",
      "description": "В отличном состоянии",
      "price": 85000,
      "category": "electronics",
      "condition": "excellent",
      "images": ["/img/iphone.jpg"],
      "location": "Москва",
      "tags": ["apple"],
      "status": "active",
      "views": 7,
      "favorites": ["3f2b8c1e-9a4d-4e7b-8c21-5d6f0a1b2c3d"],
      "createdAt": "2024-05-01T10:00:00.000Z",
      "updatedAt": "2024-05-02T08:30:15.250Z"
    }"#;

    let l: Listing = serde_json::from_str(raw).unwrap();
    assert_eq!(l.price.get(), 85_000.0);
    assert_eq!(l.category, Category::Electronics);
    assert_eq!(l.condition, Condition::Excellent);
    assert!(l.is_active());
    assert!(l.is_favorited_by(l.account_id));
    assert_eq!(l.created_at.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    assert_eq!(l.updated_at.timestamp_subsec_millis(), 250);
  }

  #[test]
  fn stored_non_positive_price_fails_to_decode() {
    let mut json = serde_json::to_value(listing("x")).unwrap();
    json["price"] = serde_json::json!(0);
    assert!(serde_json::from_value::<Listing>(json).is_err());
  }

  // ─── Enums ─────────────────────────────────────────────────────────────────

  #[test]
  fn category_round_trips_through_its_key() {
    for c in Category::iter() {
      assert_eq!(c.as_ref().parse::<Category>().unwrap(), c);
      assert_eq!(
        serde_json::to_value(c).unwrap(),
        serde_json::json!(c.as_ref())
      );
    }
    assert_eq!(Category::Home.label(), "Дом и сад");
    assert!("furniture".parse::<Category>().is_err());
  }

  // ─── Favorites ─────────────────────────────────────────────────────────────

  #[test]
  fn toggle_favorite_is_symmetric() {
    let mut l = listing("Велосипед");
    let other = Uuid::new_v4();
    l.favorites.push(other);
    let original = l.favorites.clone();

    let account = Uuid::new_v4();
    assert!(l.toggle_favorite(account));
    assert!(l.is_favorited_by(account));
    assert!(!l.toggle_favorite(account));
    assert_eq!(l.favorites, original);
  }

  // ─── Query matching ────────────────────────────────────────────────────────

  #[test]
  fn text_matches_title_description_or_tag_case_insensitively() {
    let l = listing("iPhone 14 Pro Max 256GB");
    assert!(ListingQuery::text("IPHONE").matches(&l));
    assert!(ListingQuery::text("отличном").matches(&l));
    assert!(ListingQuery::text("SMART").matches(&l));
    assert!(!ListingQuery::text("macbook").matches(&l));
  }

  #[test]
  fn empty_query_matches_every_active_listing() {
    let mut l = listing("Куртка");
    assert!(ListingQuery::default().matches(&l));
    assert!(ListingQuery::text("").matches(&l));

    l.status = ListingStatus::Sold;
    assert!(!ListingQuery::default().matches(&l));
  }

  #[test]
  fn price_bounds_are_inclusive() {
    let l = listing("iPhone");
    let q = ListingQuery {
      min_price: Some(85_000.0),
      max_price: Some(85_000.0),
      ..Default::default()
    };
    assert!(q.matches(&l));

    let q = ListingQuery { min_price: Some(85_000.01), ..Default::default() };
    assert!(!q.matches(&l));

    let q = ListingQuery { max_price: Some(84_999.0), ..Default::default() };
    assert!(!q.matches(&l));
  }

  #[test]
  fn category_and_location_narrow_results() {
    let l = listing("iPhone");
    let q = ListingQuery {
      category: Some(Category::Clothing),
      ..Default::default()
    };
    assert!(!q.matches(&l));

    let q = ListingQuery {
      category: Some(Category::Electronics),
      location: Some("моск".into()),
      ..Default::default()
    };
    assert!(q.matches(&l));

    let q = ListingQuery { location: Some("Казань".into()), ..Default::default() };
    assert!(!q.matches(&l));
  }

  #[test]
  fn sort_puts_newest_first() {
    let mut old = listing("old");
    old.created_at -= Duration::hours(2);
    let mut mid = listing("mid");
    mid.created_at -= Duration::hours(1);
    let new = listing("new");

    let mut v = vec![old, new, mid];
    sort_newest_first(&mut v);
    let titles: Vec<_> = v.iter().map(|l| l.title.as_str()).collect();
    assert_eq!(titles, ["new", "mid", "old"]);
  }

  #[test]
  fn patch_stamps_updated_at() {
    let mut l = listing("x");
    let later = l.updated_at + Duration::seconds(5);
    ListingPatch::status(ListingStatus::Sold).apply(&mut l, later);
    assert_eq!(l.status, ListingStatus::Sold);
    assert_eq!(l.updated_at, later);
    assert_eq!(l.title, "x");
  }
}
