//! ProPublica Congress API client implementing
//! [`BillFeed`](billwatch_core::feed::BillFeed).

mod client;
mod payload;

pub mod error;

pub use client::{DEFAULT_BASE_URL, FeedConfig, ProPublicaFeed};
pub use error::{Error, Result};
pub use payload::RELEVANT_BILL_TYPES;
