//! Notification outbox.
//!
//! Scheduling a notification inserts one row into `notifications`. Delivery
//! is someone else's problem: workers poll [`SqliteStore::pending_notifications`]
//! for rows whose `deliver_after` has passed.

use std::time::Duration;

use billwatch_core::notify::{Notifier, NotificationKind, ScheduledNotification};
use chrono::{DateTime, SubsecRound as _, Utc};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{RawNotification, encode_dt, encode_uuid},
  store::SqliteStore,
};

impl Notifier for SqliteStore {
  type Error = Error;

  async fn schedule<'a>(
    &'a self,
    kind:        NotificationKind,
    entity_type: &'a str,
    entity_id:   Uuid,
    delay:       Duration,
  ) -> Result<ScheduledNotification> {
    let delay = chrono::Duration::from_std(delay)
      .map_err(|e| Error::DateParse(format!("notification delay: {e}")))?;

    let enqueued_at = Utc::now().trunc_subsecs(6);
    let notification = ScheduledNotification {
      notification_id: Uuid::new_v4(),
      kind,
      entity_type: entity_type.to_owned(),
      entity_id,
      enqueued_at,
      deliver_after: enqueued_at + delay,
    };

    let id_str       = encode_uuid(notification.notification_id);
    let kind_str     = kind.as_str();
    let entity_type  = notification.entity_type.clone();
    let entity_str   = encode_uuid(entity_id);
    let enqueued_str = encode_dt(notification.enqueued_at);
    let deliver_str  = encode_dt(notification.deliver_after);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO notifications
             (notification_id, kind, entity_type, entity_id, enqueued_at, deliver_after)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            id_str,
            kind_str,
            entity_type,
            entity_str,
            enqueued_str,
            deliver_str
          ],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(
      kind = %notification.kind,
      entity_id = %notification.entity_id,
      deliver_after = %notification.deliver_after,
      "notification enqueued"
    );
    Ok(notification)
  }
}

impl SqliteStore {
  /// Outbox rows in enqueue order. With `due_at`, only rows deliverable at
  /// that moment are returned.
  pub async fn pending_notifications(
    &self,
    due_at: Option<DateTime<Utc>>,
  ) -> Result<Vec<ScheduledNotification>> {
    let due_str = due_at.map(encode_dt);

    let raws: Vec<RawNotification> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT notification_id, kind, entity_type, entity_id,
                  enqueued_at, deliver_after
           FROM notifications
           WHERE ?1 IS NULL OR deliver_after <= ?1
           ORDER BY enqueued_at, rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![due_str], RawNotification::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawNotification::into_notification).collect()
  }
}
