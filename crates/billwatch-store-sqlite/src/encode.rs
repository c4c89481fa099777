//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 UTC strings with fixed microsecond precision so
//! they sort lexicographically. Dates are ISO 8601 (`YYYY-MM-DD`). UUIDs are
//! hyphenated lowercase strings.

use billwatch_core::{
  bill::{Bill, FeatureState},
  notify::{NotificationKind, ScheduledNotification},
  reference::{Committee, Congress, Member, Tag},
  sync_run::{SyncKind, SyncOutcome, SyncRun},
};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

fn decode_opt_date(s: Option<String>) -> Result<Option<NaiveDate>> {
  s.as_deref().map(decode_date).transpose()
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

// ─── Bills ───────────────────────────────────────────────────────────────────

/// Column list matching [`RawBill::from_row`], qualified with the `b` alias.
pub const BILL_COLUMNS: &str = "
  b.bill_id, b.congress_id, b.number, b.title, b.summary, b.full_text_url,
  b.introduced_on, b.house_voted_on, b.senate_voted_on, b.enacted_on,
  b.vetoed_on, b.house_result, b.senate_result, b.deep_scraped_on,
  b.feature_state, b.feature_position, b.is_visible, b.created_at,
  b.updated_at";

/// A bill row as raw column values, before parsing.
pub struct RawBill {
  pub bill_id:          String,
  pub congress_id:      String,
  pub number:           String,
  pub title:            String,
  pub summary:          Option<String>,
  pub full_text_url:    Option<String>,
  pub introduced_on:    Option<String>,
  pub house_voted_on:   Option<String>,
  pub senate_voted_on:  Option<String>,
  pub enacted_on:       Option<String>,
  pub vetoed_on:        Option<String>,
  pub house_result:     Option<String>,
  pub senate_result:    Option<String>,
  pub deep_scraped_on:  Option<String>,
  pub feature_state:    String,
  pub feature_position: Option<i64>,
  pub is_visible:       bool,
  pub created_at:       String,
  pub updated_at:       String,
}

impl RawBill {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      bill_id:          row.get(0)?,
      congress_id:      row.get(1)?,
      number:           row.get(2)?,
      title:            row.get(3)?,
      summary:          row.get(4)?,
      full_text_url:    row.get(5)?,
      introduced_on:    row.get(6)?,
      house_voted_on:   row.get(7)?,
      senate_voted_on:  row.get(8)?,
      enacted_on:       row.get(9)?,
      vetoed_on:        row.get(10)?,
      house_result:     row.get(11)?,
      senate_result:    row.get(12)?,
      deep_scraped_on:  row.get(13)?,
      feature_state:    row.get(14)?,
      feature_position: row.get(15)?,
      is_visible:       row.get(16)?,
      created_at:       row.get(17)?,
      updated_at:       row.get(18)?,
    })
  }

  pub fn into_bill(self) -> Result<Bill> {
    Ok(Bill {
      bill_id:          decode_uuid(&self.bill_id)?,
      congress_id:      decode_uuid(&self.congress_id)?,
      number:           self.number,
      title:            self.title,
      summary:          self.summary,
      full_text_url:    self.full_text_url,
      introduced_on:    decode_opt_date(self.introduced_on)?,
      house_voted_on:   decode_opt_date(self.house_voted_on)?,
      senate_voted_on:  decode_opt_date(self.senate_voted_on)?,
      enacted_on:       decode_opt_date(self.enacted_on)?,
      vetoed_on:        decode_opt_date(self.vetoed_on)?,
      house_result:     self.house_result,
      senate_result:    self.senate_result,
      deep_scraped_on:  decode_opt_dt(self.deep_scraped_on)?,
      feature_state:    FeatureState::parse(&self.feature_state)?,
      feature_position: self.feature_position,
      is_visible:       self.is_visible,
      created_at:       Some(decode_dt(&self.created_at)?),
      updated_at:       Some(decode_dt(&self.updated_at)?),
    })
  }
}

// ─── Reference rows ──────────────────────────────────────────────────────────

pub struct RawCongress {
  pub congress_id: String,
  pub number:      u32,
}

impl RawCongress {
  pub fn into_congress(self) -> Result<Congress> {
    Ok(Congress {
      congress_id: decode_uuid(&self.congress_id)?,
      number:      self.number,
    })
  }
}

pub struct RawCommittee {
  pub committee_id: String,
  pub bioguide_id:  String,
  pub name:         Option<String>,
}

impl RawCommittee {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      committee_id: row.get(0)?,
      bioguide_id:  row.get(1)?,
      name:         row.get(2)?,
    })
  }

  pub fn into_committee(self) -> Result<Committee> {
    Ok(Committee {
      committee_id: decode_uuid(&self.committee_id)?,
      bioguide_id:  self.bioguide_id,
      name:         self.name,
    })
  }
}

pub struct RawTag {
  pub tag_id: String,
  pub name:   String,
}

impl RawTag {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { tag_id: row.get(0)?, name: row.get(1)? })
  }

  pub fn into_tag(self) -> Result<Tag> {
    Ok(Tag { tag_id: decode_uuid(&self.tag_id)?, name: self.name })
  }
}

pub struct RawMember {
  pub member_id:   String,
  pub bioguide_id: String,
  pub name:        Option<String>,
  pub party:       Option<String>,
}

impl RawMember {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      member_id:   row.get(0)?,
      bioguide_id: row.get(1)?,
      name:        row.get(2)?,
      party:       row.get(3)?,
    })
  }

  pub fn into_member(self) -> Result<Member> {
    Ok(Member {
      member_id:   decode_uuid(&self.member_id)?,
      bioguide_id: self.bioguide_id,
      name:        self.name,
      party:       self.party,
    })
  }
}

// ─── Notifications ───────────────────────────────────────────────────────────

pub struct RawNotification {
  pub notification_id: String,
  pub kind:            String,
  pub entity_type:     String,
  pub entity_id:       String,
  pub enqueued_at:     String,
  pub deliver_after:   String,
}

impl RawNotification {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      notification_id: row.get(0)?,
      kind:            row.get(1)?,
      entity_type:     row.get(2)?,
      entity_id:       row.get(3)?,
      enqueued_at:     row.get(4)?,
      deliver_after:   row.get(5)?,
    })
  }

  pub fn into_notification(self) -> Result<ScheduledNotification> {
    Ok(ScheduledNotification {
      notification_id: decode_uuid(&self.notification_id)?,
      kind:            NotificationKind::parse(&self.kind)?,
      entity_type:     self.entity_type,
      entity_id:       decode_uuid(&self.entity_id)?,
      enqueued_at:     decode_dt(&self.enqueued_at)?,
      deliver_after:   decode_dt(&self.deliver_after)?,
    })
  }
}

// ─── Sync runs ───────────────────────────────────────────────────────────────

pub struct RawSyncRun {
  pub run_id:         String,
  pub kind:           String,
  pub started_at:     String,
  pub finished_at:    Option<String>,
  pub status:         String,
  pub error:          Option<String>,
  pub records_seen:   i64,
  pub records_synced: i64,
}

impl RawSyncRun {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      run_id:         row.get(0)?,
      kind:           row.get(1)?,
      started_at:     row.get(2)?,
      finished_at:    row.get(3)?,
      status:         row.get(4)?,
      error:          row.get(5)?,
      records_seen:   row.get(6)?,
      records_synced: row.get(7)?,
    })
  }

  pub fn into_run(self) -> Result<SyncRun> {
    Ok(SyncRun {
      run_id:         decode_uuid(&self.run_id)?,
      kind:           SyncKind::parse(&self.kind)?,
      started_at:     decode_dt(&self.started_at)?,
      finished_at:    decode_opt_dt(self.finished_at)?,
      outcome:        SyncOutcome::from_parts(&self.status, self.error)?,
      records_seen:   self.records_seen.max(0) as u64,
      records_synced: self.records_synced.max(0) as u64,
    })
  }
}

pub fn outcome_error(outcome: &SyncOutcome) -> Option<String> {
  match outcome {
    SyncOutcome::Failed { error } => Some(error.clone()),
    SyncOutcome::Running | SyncOutcome::Completed => None,
  }
}
