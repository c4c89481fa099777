//! Sync run records.
//!
//! Every `SyncAll` pass is bracketed by a persisted [`SyncRun`]. A run that
//! has not finished doubles as the lock that keeps a second pass of the same
//! kind from starting.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SyncKind {
  RecentBills,
}

impl SyncKind {
  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownSyncKind(s.to_owned()))
  }

  pub fn as_str(self) -> &'static str { self.into() }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SyncOutcome {
  Running,
  Completed,
  Failed { error: String },
}

impl SyncOutcome {
  /// The value stored in the `status` column.
  pub fn status_str(&self) -> &'static str {
    match self {
      Self::Running => "running",
      Self::Completed => "completed",
      Self::Failed { .. } => "failed",
    }
  }

  /// Rebuild from the `status` and `error` columns.
  pub fn from_parts(status: &str, error: Option<String>) -> Result<Self> {
    match status {
      "running" => Ok(Self::Running),
      "completed" => Ok(Self::Completed),
      "failed" => Ok(Self::Failed { error: error.unwrap_or_default() }),
      other => Err(Error::UnknownSyncStatus(other.to_owned())),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRun {
  pub run_id:         Uuid,
  pub kind:           SyncKind,
  pub started_at:     DateTime<Utc>,
  pub finished_at:    Option<DateTime<Utc>>,
  pub outcome:        SyncOutcome,
  /// Relevant records returned by the feed.
  pub records_seen:   u64,
  /// Records upserted successfully before the run ended.
  pub records_synced: u64,
}

impl SyncRun {
  pub fn is_running(&self) -> bool { self.finished_at.is_none() }

  pub fn complete(&mut self, at: DateTime<Utc>) {
    self.finished_at = Some(at);
    self.outcome = SyncOutcome::Completed;
  }

  pub fn fail(&mut self, at: DateTime<Utc>, error: impl Into<String>) {
    self.finished_at = Some(at);
    self.outcome = SyncOutcome::Failed { error: error.into() };
  }
}
