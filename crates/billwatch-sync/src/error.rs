//! Error type for `billwatch-sync`.
//!
//! Collaborator errors are boxed so the engine stays generic over its feed,
//! store and notifier.

use thiserror::Error;
use uuid::Uuid;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum SyncError {
  #[error("sync failed: feed error: {0}")]
  Feed(#[source] BoxError),

  #[error("sync failed: store error: {0}")]
  Store(#[source] BoxError),

  #[error("sync failed: notification error: {0}")]
  Notify(#[source] BoxError),

  #[error("sync failed: bill references unknown congress {0}")]
  MissingCongress(Uuid),

  #[error("sync failed: bill {0} is not in the store")]
  MissingBill(Uuid),
}

impl SyncError {
  pub(crate) fn feed<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Self::Feed(Box::new(e))
  }

  pub(crate) fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Self::Store(Box::new(e))
  }

  pub(crate) fn notify<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Self::Notify(Box::new(e))
  }
}

pub type Result<T, E = SyncError> = std::result::Result<T, E>;
