//! The bill sync engine.
//!
//! [`SyncEngine`] pulls records from a
//! [`BillFeed`](billwatch_core::feed::BillFeed), reconciles them into a
//! [`BillStore`](billwatch_core::store::BillStore), enriches new bills once,
//! and schedules change notifications through a
//! [`Notifier`](billwatch_core::notify::Notifier). [`report`] assembles the
//! read-side view of a single bill.

pub mod engine;
pub mod error;
pub mod report;

pub use engine::{SyncEngine, SyncOptions, UpsertOutcome};
pub use error::{Result, SyncError};
pub use report::BillReport;
