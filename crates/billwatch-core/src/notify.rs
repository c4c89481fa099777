//! Change notifications and the dispatcher seam.

use std::{future::Future, time::Duration};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  bill::{BillChanges, BillColumn},
};

/// Delay applied to change notifications unless configured otherwise.
pub const DEFAULT_NOTIFICATION_DELAY: Duration = Duration::from_secs(30);

/// Entity type recorded on notifications about bills.
pub const BILL_ENTITY: &str = "Bill";

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
pub enum NotificationKind {
  BillHouseChange,
  BillSenateChange,
  BillEnacted,
  BillVetoed,
}

impl NotificationKind {
  /// Each kind paired with the column whose change triggers it.
  pub const WATCHED: [(NotificationKind, BillColumn); 4] = [
    (NotificationKind::BillHouseChange, BillColumn::HouseResult),
    (NotificationKind::BillSenateChange, BillColumn::SenateResult),
    (NotificationKind::BillEnacted, BillColumn::EnactedOn),
    (NotificationKind::BillVetoed, BillColumn::VetoedOn),
  ];

  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownNotificationKind(s.to_owned()))
  }

  pub fn as_str(self) -> &'static str { self.into() }

  /// The kinds to send for a save that changed `changes`, in table order.
  pub fn triggered_by(changes: &BillChanges) -> Vec<Self> {
    Self::WATCHED
      .iter()
      .filter(|(_, column)| changes.contains(*column))
      .map(|(kind, _)| *kind)
      .collect()
  }
}

/// A notification accepted by the dispatcher, awaiting delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledNotification {
  pub notification_id: Uuid,
  pub kind:            NotificationKind,
  pub entity_type:     String,
  pub entity_id:       Uuid,
  pub enqueued_at:     DateTime<Utc>,
  /// Earliest moment a worker may deliver it.
  pub deliver_after:   DateTime<Utc>,
}

/// Abstraction over delayed, fire-and-forget notification delivery.
///
/// The caller's obligation ends once `schedule` returns `Ok`.
pub trait Notifier: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn schedule<'a>(
    &'a self,
    kind: NotificationKind,
    entity_type: &'a str,
    entity_id: Uuid,
    delay: Duration,
  ) -> impl Future<Output = Result<ScheduledNotification, Self::Error>> + Send + 'a;
}
