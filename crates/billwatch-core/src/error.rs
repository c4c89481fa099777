//! Error types for `billwatch-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown feature state: {0:?}")]
  UnknownFeatureState(String),

  #[error("unknown sponsorship type: {0:?}")]
  UnknownSponsorshipType(String),

  #[error("unknown chamber id: {0}")]
  UnknownChamber(i64),

  #[error("unknown vote position: {0:?}")]
  UnknownVotePosition(String),

  #[error("unknown notification kind: {0:?}")]
  UnknownNotificationKind(String),

  #[error("unknown sync kind: {0:?}")]
  UnknownSyncKind(String),

  #[error("unknown sync status: {0:?}")]
  UnknownSyncStatus(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
