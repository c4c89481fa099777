//! Core types and trait definitions for billwatch.
//!
//! This crate is deliberately free of HTTP and database dependencies. It owns
//! the bill model, the collaborator traits the sync engine talks to (feed,
//! store, notifier), and the pure bill status engine.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod activity;
pub mod bill;
pub mod error;
pub mod feed;
pub mod notify;
pub mod reference;
pub mod status;
pub mod store;
pub mod sync_run;

pub use error::{Error, Result};
