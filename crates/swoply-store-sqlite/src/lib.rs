//! SQLite backend for the Swoply marketplace store.
//!
//! The database is used as a plain key-value namespace: each collection is a
//! JSON array stored under a fixed key, mirroring the browser storefront's
//! storage layout. [`tokio_rusqlite`] runs all access on a dedicated thread so
//! the async runtime is never blocked.

mod kv;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use kv::{ACCOUNTS_KEY, LISTINGS_KEY, MESSAGES_KEY, SESSION_KEY};
pub use store::SqliteStore;
