//! Writes that sit outside the sync path: seeding reference data, recording
//! votes and user activity, curation, and deletion.

use billwatch_core::{
  activity::{NewVote, Position, Vote},
  bill::FeatureState,
  reference::{Committee, Member, NewCommittee, NewMember},
};
use chrono::{SubsecRound as _, Utc};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{RawCommittee, RawMember, encode_date, encode_dt, encode_uuid},
  store::SqliteStore,
};

impl SqliteStore {
  // ── Reference data ────────────────────────────────────────────────────────

  /// Insert a member, or refresh the name and party of an existing one with
  /// the same bioguide id.
  pub async fn upsert_member(&self, input: NewMember) -> Result<Member> {
    let id_str = encode_uuid(Uuid::new_v4());

    let raw: RawMember = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO members (member_id, bioguide_id, name, party)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT(bioguide_id) DO UPDATE SET
             name  = COALESCE(excluded.name, members.name),
             party = COALESCE(excluded.party, members.party)",
          rusqlite::params![id_str, input.bioguide_id, input.name, input.party],
        )?;
        Ok(conn.query_row(
          "SELECT member_id, bioguide_id, name, party FROM members
           WHERE bioguide_id = ?1",
          rusqlite::params![input.bioguide_id],
          RawMember::from_row,
        )?)
      })
      .await?;

    raw.into_member()
  }

  /// Insert a committee, or refresh the name of an existing one.
  pub async fn upsert_committee(&self, input: NewCommittee) -> Result<Committee> {
    let id_str = encode_uuid(Uuid::new_v4());

    let raw: RawCommittee = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO committees (committee_id, bioguide_id, name)
           VALUES (?1, ?2, ?3)
           ON CONFLICT(bioguide_id) DO UPDATE SET
             name = COALESCE(excluded.name, committees.name)",
          rusqlite::params![id_str, input.bioguide_id, input.name],
        )?;
        Ok(conn.query_row(
          "SELECT committee_id, bioguide_id, name FROM committees
           WHERE bioguide_id = ?1",
          rusqlite::params![input.bioguide_id],
          RawCommittee::from_row,
        )?)
      })
      .await?;

    raw.into_committee()
  }

  // ── Activity ──────────────────────────────────────────────────────────────

  pub async fn record_vote(&self, input: NewVote) -> Result<Vote> {
    let vote = Vote {
      vote_id:   Uuid::new_v4(),
      bill_id:   input.bill_id,
      member_id: input.member_id,
      chamber:   input.chamber,
      position:  input.position,
      cast_on:   input.cast_on,
    };

    let vote_str     = encode_uuid(vote.vote_id);
    let bill_str     = encode_uuid(vote.bill_id);
    let member_str   = encode_uuid(vote.member_id);
    let chamber_id   = vote.chamber.id();
    let position_str = vote.position.as_str();
    let cast_on      = vote.cast_on.map(encode_date);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO votes (vote_id, bill_id, member_id, chamber_id, position, cast_on)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            vote_str,
            bill_str,
            member_str,
            chamber_id,
            position_str,
            cast_on
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(vote)
  }

  /// Record a user's stance. Positive values support, negative oppose,
  /// zero is neutral.
  pub async fn record_position(
    &self,
    bill_id: Uuid,
    user_id: Uuid,
    value:   i32,
  ) -> Result<Position> {
    let position = Position {
      position_id: Uuid::new_v4(),
      bill_id,
      user_id,
      value,
      recorded_at: Utc::now().trunc_subsecs(6),
    };

    let id_str   = encode_uuid(position.position_id);
    let bill_str = encode_uuid(bill_id);
    let user_str = encode_uuid(user_id);
    let at_str   = encode_dt(position.recorded_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO positions (position_id, bill_id, user_id, position, recorded_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![id_str, bill_str, user_str, value, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(position)
  }

  /// Follow a bill. Returns `false` if the user already followed it.
  pub async fn add_favorite(&self, bill_id: Uuid, user_id: Uuid) -> Result<bool> {
    let id_str   = encode_uuid(Uuid::new_v4());
    let bill_str = encode_uuid(bill_id);
    let user_str = encode_uuid(user_id);
    let now_str  = encode_dt(Utc::now());

    let inserted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO favorites (favorite_id, bill_id, user_id, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, bill_str, user_str, now_str],
        )?)
      })
      .await?;
    Ok(inserted > 0)
  }

  // ── Curation ──────────────────────────────────────────────────────────────

  pub async fn set_feature(
    &self,
    bill_id:  Uuid,
    state:    FeatureState,
    position: Option<i64>,
  ) -> Result<()> {
    let bill_str  = encode_uuid(bill_id);
    let state_str = state.as_str();
    let now_str   = encode_dt(Utc::now());

    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE bills
           SET feature_state = ?2, feature_position = ?3, updated_at = ?4
           WHERE bill_id = ?1",
          rusqlite::params![bill_str, state_str, position, now_str],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::BillNotFound(bill_id));
    }
    Ok(())
  }

  pub async fn set_visible(&self, bill_id: Uuid, visible: bool) -> Result<()> {
    let bill_str = encode_uuid(bill_id);
    let now_str  = encode_dt(Utc::now());

    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE bills SET is_visible = ?2, updated_at = ?3 WHERE bill_id = ?1",
          rusqlite::params![bill_str, visible, now_str],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(Error::BillNotFound(bill_id));
    }
    Ok(())
  }

  // ── Deletion ──────────────────────────────────────────────────────────────

  /// Delete a bill together with its sponsorships, votes, positions,
  /// favorites and associations. Outbox rows are left alone.
  pub async fn delete_bill(&self, bill_id: Uuid) -> Result<()> {
    let bill_str = encode_uuid(bill_id);

    let deleted = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM bills WHERE bill_id = ?1",
          rusqlite::params![bill_str],
        )?)
      })
      .await?;

    if deleted == 0 {
      return Err(Error::BillNotFound(bill_id));
    }
    Ok(())
  }
}
