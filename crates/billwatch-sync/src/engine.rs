//! [`SyncEngine`] reconciles upstream feed records into the store.

use std::time::Duration;

use billwatch_core::{
  bill::{Bill, BillChanges, feed_slug},
  feed::{BillFeed, FeedRecord},
  notify::{BILL_ENTITY, DEFAULT_NOTIFICATION_DELAY, NotificationKind, Notifier},
  store::BillStore,
  sync_run::{SyncKind, SyncRun},
};
use chrono::{DateTime, SubsecRound as _, Utc};

use crate::error::{Result, SyncError};

/// Tunables for a [`SyncEngine`].
#[derive(Debug, Clone)]
pub struct SyncOptions {
  /// How long change notifications wait before they become deliverable.
  pub notification_delay: Duration,
}

impl Default for SyncOptions {
  fn default() -> Self {
    Self { notification_delay: DEFAULT_NOTIFICATION_DELAY }
  }
}

/// What a single upsert or refresh did to a bill.
#[derive(Debug, Clone)]
pub struct UpsertOutcome {
  /// The bill as stored after the operation.
  pub bill:     Bill,
  /// True when the bill did not exist before.
  pub created:  bool,
  /// Columns this save changed.
  pub changes:  BillChanges,
  /// Notifications scheduled for those changes, in table order.
  pub notified: Vec<NotificationKind>,
  /// True when the one-time enrichment ran during this call.
  pub enriched: bool,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

pub struct SyncEngine<F, S, N> {
  feed:     F,
  store:    S,
  notifier: N,
  options:  SyncOptions,
}

impl<F, S, N> SyncEngine<F, S, N>
where
  F: BillFeed,
  S: BillStore,
  N: Notifier,
{
  pub fn new(feed: F, store: S, notifier: N) -> Self {
    Self { feed, store, notifier, options: SyncOptions::default() }
  }

  pub fn with_options(mut self, options: SyncOptions) -> Self {
    self.options = options;
    self
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn feed(&self) -> &F { &self.feed }

  // ── SyncAll ───────────────────────────────────────────────────────────────

  /// Upsert every relevant recent record, bracketed by a persisted run.
  ///
  /// Records are processed in feed order. The first failing record ends
  /// the pass: the run is stored as failed and the error is returned. If
  /// the completed run cannot be stored it is stored as failed instead, so
  /// the next pass is not locked out.
  pub async fn sync_all(&self) -> Result<SyncRun> {
    let mut run = self
      .store
      .begin_sync_run(SyncKind::RecentBills)
      .await
      .map_err(SyncError::store)?;
    tracing::info!(run_id = %run.run_id, kind = %run.kind, "sync run started");

    match self.sync_records(&mut run).await {
      Ok(()) => {
        run.complete(Utc::now());
        let run = match self.store.finish_sync_run(run.clone()).await {
          Ok(run) => run,
          Err(finish_err) => {
            let err = SyncError::store(finish_err);
            tracing::error!(
              run_id = %run.run_id,
              error = %err,
              "could not record completed sync run"
            );
            run.fail(Utc::now(), err.to_string());
            if let Err(retry_err) = self.store.finish_sync_run(run.clone()).await {
              tracing::warn!(
                run_id = %run.run_id,
                error = %retry_err,
                "sync run left open until it goes stale"
              );
            }
            return Err(err);
          }
        };
        tracing::info!(
          run_id = %run.run_id,
          seen = run.records_seen,
          synced = run.records_synced,
          "sync run completed"
        );
        Ok(run)
      }
      Err(err) => {
        run.fail(Utc::now(), err.to_string());
        tracing::error!(
          run_id = %run.run_id,
          synced = run.records_synced,
          error = %err,
          "sync run failed"
        );
        let run_id = run.run_id;
        if let Err(finish_err) = self.store.finish_sync_run(run).await {
          tracing::warn!(%run_id, error = %finish_err, "could not record failed sync run");
        }
        Err(err)
      }
    }
  }

  async fn sync_records(&self, run: &mut SyncRun) -> Result<()> {
    let records = self.feed.fetch_recent().await.map_err(SyncError::feed)?;
    let relevant: Vec<FeedRecord> =
      records.into_iter().filter(FeedRecord::is_relevant).collect();
    run.records_seen = relevant.len() as u64;

    for record in &relevant {
      self.upsert_one(record).await?;
      run.records_synced += 1;
    }
    Ok(())
  }

  // ── UpsertOne ─────────────────────────────────────────────────────────────

  /// Create or update the bill `record` describes.
  ///
  /// Descriptive fields are overwritten, timeline dates are only filled
  /// where empty, and the one-time enrichment runs if it has not already.
  /// The steps are not wrapped in a single transaction.
  pub async fn upsert_one(&self, record: &FeedRecord) -> Result<UpsertOutcome> {
    let congress = self
      .store
      .find_or_create_congress(record.congress)
      .await
      .map_err(SyncError::store)?;
    let mut bill = self
      .store
      .find_or_initialize_bill(&congress, &record.number)
      .await
      .map_err(SyncError::store)?;

    let before = bill.clone();
    record.apply_core_fields(&mut bill);
    record.apply_timeline_first_write(&mut bill);

    let mut bill = self.store.save_bill(bill).await.map_err(SyncError::store)?;
    let changes = bill.changes_since(&before);
    let notified = self.dispatch_change_notifications(&bill, &changes).await?;

    let enriched = bill.deep_scraped_on.is_none();
    if enriched {
      let at = self.deep_scrape(&bill, record).await?;
      bill.deep_scraped_on = Some(at);
      bill.updated_at = Some(at);
    }

    tracing::debug!(
      bill = %bill,
      congress = congress.number,
      created = !before.is_persisted(),
      changed = changes.len(),
      enriched,
      "bill upserted"
    );

    Ok(UpsertOutcome {
      bill,
      created: !before.is_persisted(),
      changes,
      notified,
      enriched,
    })
  }

  /// Attach committees, tags and sponsors, then stamp `deep_scraped_on`.
  /// Returns the stamp, which is also the row's new `updated_at`.
  async fn deep_scrape(&self, bill: &Bill, record: &FeedRecord) -> Result<DateTime<Utc>> {
    for bioguide_id in &record.committee_bioguide_ids {
      match self
        .store
        .find_committee(bioguide_id)
        .await
        .map_err(SyncError::store)?
      {
        Some(committee) => self
          .store
          .add_committee(bill.bill_id, committee.committee_id)
          .await
          .map_err(SyncError::store)?,
        None => {
          tracing::warn!(bill = %bill, committee = %bioguide_id, "unknown committee, skipped")
        }
      }
    }

    for name in &record.tag_names {
      let tag = self
        .store
        .find_or_create_tag(name)
        .await
        .map_err(SyncError::store)?;
      self
        .store
        .add_tag(bill.bill_id, tag.tag_id)
        .await
        .map_err(SyncError::store)?;
    }

    let sponsor = match &record.sponsor_bioguide_id {
      Some(bioguide_id) => {
        let member = self
          .store
          .find_member(bioguide_id)
          .await
          .map_err(SyncError::store)?;
        if member.is_none() {
          tracing::warn!(bill = %bill, sponsor = %bioguide_id, "unknown sponsor, cleared");
        }
        member
      }
      None => None,
    };
    self
      .store
      .set_sponsor(bill.bill_id, sponsor.map(|m| m.member_id))
      .await
      .map_err(SyncError::store)?;

    if !record.cosponsor_bioguide_ids.is_empty() {
      let members = self
        .store
        .find_members(&record.cosponsor_bioguide_ids)
        .await
        .map_err(SyncError::store)?;
      if members.len() < record.cosponsor_bioguide_ids.len() {
        tracing::warn!(
          bill = %bill,
          listed = record.cosponsor_bioguide_ids.len(),
          known = members.len(),
          "some cosponsors are unknown"
        );
      }
      self
        .store
        .set_cosponsors(bill.bill_id, members.into_iter().map(|m| m.member_id).collect())
        .await
        .map_err(SyncError::store)?;
    }

    let at = Utc::now().trunc_subsecs(6);
    self
      .store
      .touch_deep_scraped(bill.bill_id, at)
      .await
      .map_err(SyncError::store)?;
    Ok(at)
  }

  // ── RefreshOne ────────────────────────────────────────────────────────────

  /// Re-fetch `bill` from the feed and overwrite every feed attribute,
  /// clearing values the feed no longer reports. Enrichment does not run.
  ///
  /// `bill` only identifies the row; the stored copy is reloaded so curation
  /// and enrichment state written since are kept.
  pub async fn refresh_one(&self, bill: &Bill) -> Result<UpsertOutcome> {
    let current = self
      .store
      .get_bill(bill.bill_id)
      .await
      .map_err(SyncError::store)?
      .ok_or(SyncError::MissingBill(bill.bill_id))?;

    let congress = self
      .store
      .get_congress(current.congress_id)
      .await
      .map_err(SyncError::store)?
      .ok_or(SyncError::MissingCongress(current.congress_id))?;

    let slug = feed_slug(&current.number);
    let record = self
      .feed
      .fetch_one(congress.number, &slug)
      .await
      .map_err(SyncError::feed)?;

    let mut updated = current.clone();
    record.apply_all(&mut updated);

    let saved = self.store.save_bill(updated).await.map_err(SyncError::store)?;
    let changes = saved.changes_since(&current);
    let notified = self.dispatch_change_notifications(&saved, &changes).await?;

    tracing::info!(bill = %saved, changed = changes.len(), "bill refreshed");

    Ok(UpsertOutcome {
      bill: saved,
      created: false,
      changes,
      notified,
      enriched: false,
    })
  }

  // ── Notifications ─────────────────────────────────────────────────────────

  /// Schedule one notification per watched column in `changes`.
  pub async fn dispatch_change_notifications(
    &self,
    bill:    &Bill,
    changes: &BillChanges,
  ) -> Result<Vec<NotificationKind>> {
    let kinds = NotificationKind::triggered_by(changes);
    for kind in &kinds {
      self
        .notifier
        .schedule(*kind, BILL_ENTITY, bill.bill_id, self.options.notification_delay)
        .await
        .map_err(SyncError::notify)?;
      tracing::info!(bill = %bill, %kind, "change notification scheduled");
    }
    Ok(kinds)
  }
}
