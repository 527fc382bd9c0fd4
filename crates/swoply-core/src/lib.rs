//! Core types and trait definitions for the Swoply marketplace.
//!
//! This crate is deliberately free of database dependencies. Backends
//! implement [`store::MarketStore`]; the session service and the CLI depend on
//! that abstraction only.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod account;
pub mod error;
pub mod form;
pub mod listing;
pub mod message;
pub mod session;
pub mod store;

pub use error::{Error, Result};
