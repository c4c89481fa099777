//! SQLite backend for billwatch.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. [`SqliteStore`] implements both
//! [`BillStore`](billwatch_core::store::BillStore) and the notification
//! outbox ([`Notifier`](billwatch_core::notify::Notifier)).

mod admin;
mod encode;
mod notify;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
