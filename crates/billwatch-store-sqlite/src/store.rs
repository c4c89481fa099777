//! [`SqliteStore`], the SQLite implementation of [`BillStore`].

use std::path::Path;

use billwatch_core::{
  activity::{Chamber, VotePosition},
  bill::{Bill, canonical_number},
  reference::{Committee, Congress, Member, SponsorshipType, Tag},
  status::PositionTally,
  store::{BillQuery, BillStore},
  sync_run::{SyncKind, SyncOutcome, SyncRun},
};
use chrono::{DateTime, SubsecRound as _, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    BILL_COLUMNS, RawBill, RawCommittee, RawCongress, RawMember, RawSyncRun,
    RawTag, encode_date, encode_dt, encode_uuid, outcome_error,
  },
  schema::SCHEMA,
};

/// Open runs older than this are assumed to belong to a crashed process.
pub const DEFAULT_STALE_RUN_AFTER: chrono::Duration = chrono::Duration::hours(6);

const INSERT_BILL: &str = "INSERT INTO bills (
    bill_id, congress_id, number, title, summary, full_text_url,
    introduced_on, house_voted_on, senate_voted_on, enacted_on,
    vetoed_on, house_result, senate_result, deep_scraped_on,
    feature_state, feature_position, is_visible, created_at,
    updated_at
  ) VALUES (
    ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
    ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19
  )";

// ?18 (created_at) is bound but never written on update.
const UPDATE_BILL: &str = "UPDATE bills SET
    congress_id      = ?2,
    number           = ?3,
    title            = ?4,
    summary          = ?5,
    full_text_url    = ?6,
    introduced_on    = ?7,
    house_voted_on   = ?8,
    senate_voted_on  = ?9,
    enacted_on       = ?10,
    vetoed_on        = ?11,
    house_result     = ?12,
    senate_result    = ?13,
    deep_scraped_on  = ?14,
    feature_state    = ?15,
    feature_position = ?16,
    is_visible       = ?17,
    updated_at       = ?19
  WHERE bill_id = ?1";

/// A `LIKE` pattern matching `text` anywhere, with its wildcards escaped.
fn like_pattern(text: &str) -> String {
  let mut pattern = String::with_capacity(text.len() + 2);
  pattern.push('%');
  for c in text.chars() {
    if matches!(c, '%' | '_' | '\\') {
      pattern.push('\\');
    }
    pattern.push(c);
  }
  pattern.push('%');
  pattern
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A billwatch store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
  stale_run_after: chrono::Duration,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(Self { conn, stale_run_after: DEFAULT_STALE_RUN_AFTER })
  }

  /// Override how long an unfinished sync run may hold its lock.
  pub fn with_stale_run_after(mut self, after: chrono::Duration) -> Self {
    self.stale_run_after = after;
    self
  }

  /// Look up a bill by canonical number within a congress, ignoring case.
  async fn bill_by_number(
    &self,
    congress_id: Uuid,
    number:      &str,
  ) -> Result<Option<Bill>> {
    let congress_str = encode_uuid(congress_id);
    let number       = number.to_owned();

    let raw: Option<RawBill> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {BILL_COLUMNS} FROM bills b
               WHERE b.congress_id = ?1 AND b.number = ?2 COLLATE NOCASE"
            ),
            rusqlite::params![congress_str, number],
            RawBill::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawBill::into_bill).transpose()
  }

  async fn members_by_kind(
    &self,
    bill_id: Uuid,
    kind:    SponsorshipType,
  ) -> Result<Vec<Member>> {
    let bill_str = encode_uuid(bill_id);
    let kind_str = kind.as_str();

    let raws: Vec<RawMember> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT m.member_id, m.bioguide_id, m.name, m.party
           FROM sponsorships s
           JOIN members m ON m.member_id = s.member_id
           WHERE s.bill_id = ?1 AND s.kind = ?2
           ORDER BY s.rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![bill_str, kind_str], RawMember::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMember::into_member).collect()
  }
}

// ─── BillStore impl ──────────────────────────────────────────────────────────

impl BillStore for SqliteStore {
  type Error = Error;

  // ── Reference data ────────────────────────────────────────────────────────

  async fn find_or_create_congress(&self, number: u32) -> Result<Congress> {
    let id_str = encode_uuid(Uuid::new_v4());

    let raw: RawCongress = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO congresses (congress_id, number) VALUES (?1, ?2)",
          rusqlite::params![id_str, number],
        )?;
        Ok(conn.query_row(
          "SELECT congress_id, number FROM congresses WHERE number = ?1",
          rusqlite::params![number],
          |row| {
            Ok(RawCongress { congress_id: row.get(0)?, number: row.get(1)? })
          },
        )?)
      })
      .await?;

    raw.into_congress()
  }

  async fn get_congress(&self, congress_id: Uuid) -> Result<Option<Congress>> {
    let id_str = encode_uuid(congress_id);

    let raw: Option<RawCongress> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT congress_id, number FROM congresses WHERE congress_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawCongress { congress_id: row.get(0)?, number: row.get(1)? })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawCongress::into_congress).transpose()
  }

  async fn find_or_create_tag(&self, name: &str) -> Result<Tag> {
    let id_str = encode_uuid(Uuid::new_v4());
    let name   = name.to_owned();

    let raw: RawTag = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO tags (tag_id, name) VALUES (?1, ?2)",
          rusqlite::params![id_str, name],
        )?;
        Ok(conn.query_row(
          "SELECT tag_id, name FROM tags WHERE name = ?1",
          rusqlite::params![name],
          RawTag::from_row,
        )?)
      })
      .await?;

    raw.into_tag()
  }

  async fn find_committee(&self, bioguide_id: &str) -> Result<Option<Committee>> {
    let bioguide_id = bioguide_id.to_owned();

    let raw: Option<RawCommittee> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT committee_id, bioguide_id, name FROM committees
             WHERE bioguide_id = ?1",
            rusqlite::params![bioguide_id],
            RawCommittee::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawCommittee::into_committee).transpose()
  }

  async fn find_member(&self, bioguide_id: &str) -> Result<Option<Member>> {
    let bioguide_id = bioguide_id.to_owned();

    let raw: Option<RawMember> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT member_id, bioguide_id, name, party FROM members
             WHERE bioguide_id = ?1",
            rusqlite::params![bioguide_id],
            RawMember::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawMember::into_member).transpose()
  }

  async fn find_members(&self, bioguide_ids: &[String]) -> Result<Vec<Member>> {
    if bioguide_ids.is_empty() {
      return Ok(Vec::new());
    }
    let ids = bioguide_ids.to_vec();

    let raws: Vec<RawMember> = self
      .conn
      .call(move |conn| {
        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
          "SELECT member_id, bioguide_id, name, party FROM members
           WHERE bioguide_id IN ({placeholders})
           ORDER BY bioguide_id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(ids.iter()), RawMember::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMember::into_member).collect()
  }

  // ── Bills ─────────────────────────────────────────────────────────────────

  async fn find_or_initialize_bill(
    &self,
    congress: &Congress,
    number:   &str,
  ) -> Result<Bill> {
    let number = canonical_number(number);
    match self.bill_by_number(congress.congress_id, &number).await? {
      Some(bill) => Ok(bill),
      None => Ok(Bill::initialize(congress.congress_id, &number)),
    }
  }

  async fn save_bill(&self, mut bill: Bill) -> Result<Bill> {
    bill.number = canonical_number(&bill.number);

    if bill.number.trim().is_empty() {
      return Err(Error::Validation("number can't be blank".into()));
    }
    if bill.title.trim().is_empty() {
      return Err(Error::Validation(format!("{}: title can't be blank", bill.number)));
    }
    if let Some(existing) = self.bill_by_number(bill.congress_id, &bill.number).await? {
      if existing.bill_id != bill.bill_id {
        return Err(Error::Validation(format!(
          "{}: number has already been taken",
          bill.number
        )));
      }
    }

    let persisted = bill.is_persisted();
    let now = Utc::now().trunc_subsecs(6);
    bill.created_at = Some(bill.created_at.unwrap_or(now));
    bill.updated_at = Some(now);

    let bill_id_str      = encode_uuid(bill.bill_id);
    let congress_id_str  = encode_uuid(bill.congress_id);
    let number           = bill.number.clone();
    let title            = bill.title.clone();
    let summary          = bill.summary.clone();
    let full_text_url    = bill.full_text_url.clone();
    let introduced_on    = bill.introduced_on.map(encode_date);
    let house_voted_on   = bill.house_voted_on.map(encode_date);
    let senate_voted_on  = bill.senate_voted_on.map(encode_date);
    let enacted_on       = bill.enacted_on.map(encode_date);
    let vetoed_on        = bill.vetoed_on.map(encode_date);
    let house_result     = bill.house_result.clone();
    let senate_result    = bill.senate_result.clone();
    let deep_scraped_on  = bill.deep_scraped_on.map(encode_dt);
    let feature_state    = bill.feature_state.as_str();
    let feature_position = bill.feature_position;
    let is_visible       = bill.is_visible;
    let created_at       = encode_dt(bill.created_at.unwrap_or(now));
    let updated_at       = encode_dt(now);

    // A persisted bill is only ever updated, so a deleted row stays deleted.
    let sql = if persisted { UPDATE_BILL } else { INSERT_BILL };
    let written = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          sql,
          rusqlite::params![
            bill_id_str,
            congress_id_str,
            number,
            title,
            summary,
            full_text_url,
            introduced_on,
            house_voted_on,
            senate_voted_on,
            enacted_on,
            vetoed_on,
            house_result,
            senate_result,
            deep_scraped_on,
            feature_state,
            feature_position,
            is_visible,
            created_at,
            updated_at,
          ],
        )?)
      })
      .await?;

    if written == 0 {
      return Err(Error::BillNotFound(bill.bill_id));
    }
    Ok(bill)
  }

  async fn touch_deep_scraped(&self, bill_id: Uuid, at: DateTime<Utc>) -> Result<()> {
    let id_str = encode_uuid(bill_id);
    let at_str = encode_dt(at);

    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE bills SET deep_scraped_on = ?2, updated_at = ?2 WHERE bill_id = ?1",
          rusqlite::params![id_str, at_str],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::BillNotFound(bill_id));
    }
    Ok(())
  }

  async fn get_bill(&self, bill_id: Uuid) -> Result<Option<Bill>> {
    let id_str = encode_uuid(bill_id);

    let raw: Option<RawBill> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {BILL_COLUMNS} FROM bills b WHERE b.bill_id = ?1"),
            rusqlite::params![id_str],
            RawBill::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawBill::into_bill).transpose()
  }

  async fn find_bill(&self, congress: u32, number: &str) -> Result<Option<Bill>> {
    let number = canonical_number(number);

    let raw: Option<RawBill> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {BILL_COLUMNS} FROM bills b
               JOIN congresses c ON c.congress_id = b.congress_id
               WHERE c.number = ?1 AND b.number = ?2 COLLATE NOCASE"
            ),
            rusqlite::params![congress, number],
            RawBill::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawBill::into_bill).transpose()
  }

  async fn list_bills(&self, query: &BillQuery) -> Result<Vec<Bill>> {
    let text_pattern = query.text.as_deref().map(like_pattern);
    let congress     = query.congress;
    let visible_only = query.visible_only;
    let special_only = query.special_only;
    let limit_val    = query.limit.unwrap_or(100) as i64;
    let offset_val   = query.offset.unwrap_or(0) as i64;

    let order_by = if special_only {
      "b.feature_position IS NULL, b.feature_position ASC, b.number ASC"
    } else {
      "b.introduced_on IS NULL, b.introduced_on DESC, b.number ASC"
    };

    let raws: Vec<RawBill> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {BILL_COLUMNS}
           FROM bills b
           JOIN congresses c ON c.congress_id = b.congress_id
           WHERE (?1 IS NULL
                  OR b.number LIKE ?1 ESCAPE '\\'
                  OR b.title LIKE ?1 ESCAPE '\\'
                  OR b.summary LIKE ?1 ESCAPE '\\')
             AND (?2 IS NULL OR c.number = ?2)
             AND (?3 = 0 OR b.is_visible = 1)
             AND (?4 = 0 OR b.feature_state IN ('featured', 'highlighted'))
           ORDER BY {order_by}
           LIMIT ?5 OFFSET ?6"
        );

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![
              text_pattern.as_deref(),
              congress,
              visible_only,
              special_only,
              limit_val,
              offset_val,
            ],
            RawBill::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBill::into_bill).collect()
  }

  // ── Associations ──────────────────────────────────────────────────────────

  async fn add_committee(&self, bill_id: Uuid, committee_id: Uuid) -> Result<()> {
    let bill_str      = encode_uuid(bill_id);
    let committee_str = encode_uuid(committee_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO bills_committees (bill_id, committee_id)
           VALUES (?1, ?2)",
          rusqlite::params![bill_str, committee_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn add_tag(&self, bill_id: Uuid, tag_id: Uuid) -> Result<()> {
    let bill_str = encode_uuid(bill_id);
    let tag_str  = encode_uuid(tag_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT OR IGNORE INTO bills_tags (bill_id, tag_id) VALUES (?1, ?2)",
          rusqlite::params![bill_str, tag_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn set_sponsor(&self, bill_id: Uuid, member_id: Option<Uuid>) -> Result<()> {
    let bill_str   = encode_uuid(bill_id);
    let member_str = member_id.map(encode_uuid);
    let new_id     = encode_uuid(Uuid::new_v4());

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM sponsorships WHERE bill_id = ?1 AND kind = 'primary'",
          rusqlite::params![bill_str],
        )?;
        if let Some(member_str) = member_str {
          tx.execute(
            "INSERT INTO sponsorships (sponsorship_id, bill_id, member_id, kind)
             VALUES (?1, ?2, ?3, 'primary')",
            rusqlite::params![new_id, bill_str, member_str],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn set_cosponsors(&self, bill_id: Uuid, member_ids: Vec<Uuid>) -> Result<()> {
    let bill_str = encode_uuid(bill_id);
    let mut rows: Vec<(String, String)> = Vec::with_capacity(member_ids.len());
    for member_id in member_ids {
      let member_str = encode_uuid(member_id);
      if !rows.iter().any(|(_, m)| *m == member_str) {
        rows.push((encode_uuid(Uuid::new_v4()), member_str));
      }
    }

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM sponsorships WHERE bill_id = ?1 AND kind = 'cosponsor'",
          rusqlite::params![bill_str],
        )?;
        for (sponsorship_id, member_str) in &rows {
          tx.execute(
            "INSERT INTO sponsorships (sponsorship_id, bill_id, member_id, kind)
             VALUES (?1, ?2, ?3, 'cosponsor')",
            rusqlite::params![sponsorship_id, bill_str, member_str],
          )?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn bill_tags(&self, bill_id: Uuid) -> Result<Vec<Tag>> {
    let bill_str = encode_uuid(bill_id);

    let raws: Vec<RawTag> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT t.tag_id, t.name
           FROM bills_tags bt
           JOIN tags t ON t.tag_id = bt.tag_id
           WHERE bt.bill_id = ?1
           ORDER BY bt.rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![bill_str], RawTag::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTag::into_tag).collect()
  }

  async fn bill_committees(&self, bill_id: Uuid) -> Result<Vec<Committee>> {
    let bill_str = encode_uuid(bill_id);

    let raws: Vec<RawCommittee> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT c.committee_id, c.bioguide_id, c.name
           FROM bills_committees bc
           JOIN committees c ON c.committee_id = bc.committee_id
           WHERE bc.bill_id = ?1
           ORDER BY bc.rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![bill_str], RawCommittee::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCommittee::into_committee).collect()
  }

  async fn sponsor(&self, bill_id: Uuid) -> Result<Option<Member>> {
    Ok(
      self
        .members_by_kind(bill_id, SponsorshipType::Primary)
        .await?
        .into_iter()
        .next(),
    )
  }

  async fn cosponsors(&self, bill_id: Uuid) -> Result<Vec<Member>> {
    self.members_by_kind(bill_id, SponsorshipType::Cosponsor).await
  }

  async fn vote_breakdown(
    &self,
    bill_id:  Uuid,
    chamber:  Chamber,
    position: VotePosition,
    party:    &str,
  ) -> Result<u64> {
    let bill_str     = encode_uuid(bill_id);
    let chamber_id   = chamber.id();
    let position_str = position.as_str();
    let party        = party.to_owned();

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*)
           FROM votes v
           JOIN members m ON m.member_id = v.member_id
           WHERE v.bill_id = ?1
             AND v.chamber_id = ?2
             AND v.position = ?3
             AND m.party = ?4",
          rusqlite::params![bill_str, chamber_id, position_str, party],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(count.max(0) as u64)
  }

  async fn position_tally(&self, bill_id: Uuid) -> Result<PositionTally> {
    let bill_str = encode_uuid(bill_id);

    let (up, down, neutral): (i64, i64, i64) = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT
             COALESCE(SUM(position > 0), 0),
             COALESCE(SUM(position < 0), 0),
             COALESCE(SUM(position = 0), 0)
           FROM positions
           WHERE bill_id = ?1",
          rusqlite::params![bill_str],
          |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?)
      })
      .await?;

    Ok(PositionTally {
      upvotes:   up.max(0) as u64,
      downvotes: down.max(0) as u64,
      neutral:   neutral.max(0) as u64,
    })
  }

  async fn follower_count(&self, bill_id: Uuid) -> Result<u64> {
    let bill_str = encode_uuid(bill_id);

    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM favorites WHERE bill_id = ?1",
          rusqlite::params![bill_str],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(count.max(0) as u64)
  }

  // ── Sync runs ─────────────────────────────────────────────────────────────

  async fn begin_sync_run(&self, kind: SyncKind) -> Result<SyncRun> {
    let now = Utc::now().trunc_subsecs(6);
    let run = SyncRun {
      run_id:         Uuid::new_v4(),
      kind,
      started_at:     now,
      finished_at:    None,
      outcome:        SyncOutcome::Running,
      records_seen:   0,
      records_synced: 0,
    };

    let run_id_str = encode_uuid(run.run_id);
    let kind_str   = kind.as_str();
    let now_str    = encode_dt(now);
    let cutoff_str = encode_dt(now - self.stale_run_after);

    let (abandoned, opened): (usize, bool) = self
      .conn
      .call(move |conn| {
        let abandoned = conn.execute(
          "UPDATE sync_runs
           SET finished_at = ?1, status = 'failed',
               error = 'abandoned: run exceeded the stale-run timeout'
           WHERE kind = ?2 AND finished_at IS NULL AND started_at < ?3",
          rusqlite::params![now_str, kind_str, cutoff_str],
        )?;

        let inserted = conn.execute(
          "INSERT INTO sync_runs (run_id, kind, started_at, status)
           VALUES (?1, ?2, ?3, 'running')",
          rusqlite::params![run_id_str, kind_str, now_str],
        );
        let opened = match inserted {
          Ok(_) => true,
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
          {
            false
          }
          Err(e) => return Err(e.into()),
        };

        Ok((abandoned, opened))
      })
      .await?;

    if abandoned > 0 {
      tracing::warn!(%kind, abandoned, "marked stale sync runs as failed");
    }
    if !opened {
      return Err(Error::SyncInProgress(kind.to_string()));
    }
    Ok(run)
  }

  async fn finish_sync_run(&self, mut run: SyncRun) -> Result<SyncRun> {
    let finished_at = run.finished_at.unwrap_or_else(Utc::now).trunc_subsecs(6);
    run.finished_at = Some(finished_at);

    let run_id_str      = encode_uuid(run.run_id);
    let finished_at_str = encode_dt(finished_at);
    let status          = run.outcome.status_str();
    let error           = outcome_error(&run.outcome);
    let seen            = run.records_seen as i64;
    let synced          = run.records_synced as i64;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE sync_runs
           SET finished_at = ?2, status = ?3, error = ?4,
               records_seen = ?5, records_synced = ?6
           WHERE run_id = ?1",
          rusqlite::params![run_id_str, finished_at_str, status, error, seen, synced],
        )?;
        Ok(())
      })
      .await?;

    Ok(run)
  }

  async fn recent_sync_runs(&self, limit: usize) -> Result<Vec<SyncRun>> {
    let limit_val = limit as i64;

    let raws: Vec<RawSyncRun> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT run_id, kind, started_at, finished_at, status, error,
                  records_seen, records_synced
           FROM sync_runs
           ORDER BY started_at DESC
           LIMIT ?1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![limit_val], RawSyncRun::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSyncRun::into_run).collect()
  }
}
