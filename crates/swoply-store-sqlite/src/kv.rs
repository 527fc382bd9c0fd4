//! Key-value primitives over the `kv_entries` table, and the JSON encoding of
//! the values stored there.
//!
//! These functions run on the connection thread, inside
//! [`tokio_rusqlite::Connection::call`] closures.

use rusqlite::{Connection, OptionalExtension as _};
use serde::{Serialize, de::DeserializeOwned};

// ─── Keys ────────────────────────────────────────────────────────────────────

pub const ACCOUNTS_KEY: &str = "swoply_users";
pub const LISTINGS_KEY: &str = "swoply_listings";
pub const MESSAGES_KEY: &str = "swoply_messages";
pub const SESSION_KEY: &str = "swoply_session";

// ─── Raw access ──────────────────────────────────────────────────────────────

pub fn get_item(conn: &Connection, key: &str) -> rusqlite::Result<Option<String>> {
  conn
    .query_row(
      "SELECT value FROM kv_entries WHERE key = ?1",
      rusqlite::params![key],
      |row| row.get(0),
    )
    .optional()
}

pub fn set_item(conn: &Connection, key: &str, value: &str) -> rusqlite::Result<()> {
  conn.execute(
    "INSERT INTO kv_entries (key, value) VALUES (?1, ?2)
     ON CONFLICT (key) DO UPDATE SET value = excluded.value",
    rusqlite::params![key, value],
  )?;
  Ok(())
}

pub fn remove_item(conn: &Connection, key: &str) -> rusqlite::Result<()> {
  conn.execute("DELETE FROM kv_entries WHERE key = ?1", rusqlite::params![key])?;
  Ok(())
}

// ─── Encoding ────────────────────────────────────────────────────────────────

/// Decode a stored collection; an absent key is an empty collection.
pub fn decode_collection<T: DeserializeOwned>(
  raw: Option<&str>,
) -> serde_json::Result<Vec<T>> {
  match raw {
    Some(s) => serde_json::from_str(s),
    None => Ok(Vec::new()),
  }
}

pub fn encode_collection<T: Serialize>(records: &[T]) -> serde_json::Result<String> {
  serde_json::to_string(records)
}

/// Carry a JSON failure out of a connection closure. Recovered on the other
/// side by `From<tokio_rusqlite::Error> for Error`.
pub fn json_error(e: serde_json::Error) -> tokio_rusqlite::Error {
  tokio_rusqlite::Error::Other(Box::new(e))
}
