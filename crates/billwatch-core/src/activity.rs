//! Votes, positions and favorites recorded against a bill.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Chamber ─────────────────────────────────────────────────────────────────

/// A chamber of Congress. The numeric id is the stored foreign key.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Chamber {
  House,
  Senate,
}

impl Chamber {
  pub fn id(self) -> i64 {
    match self {
      Self::House => 1,
      Self::Senate => 2,
    }
  }

  pub fn from_id(id: i64) -> Result<Self> {
    match id {
      1 => Ok(Self::House),
      2 => Ok(Self::Senate),
      other => Err(Error::UnknownChamber(other)),
    }
  }
}

// ─── Votes ───────────────────────────────────────────────────────────────────

/// How a member voted on a roll call.
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
pub enum VotePosition {
  Yes,
  No,
  Present,
  NotVoting,
}

impl VotePosition {
  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownVotePosition(s.to_owned()))
  }

  pub fn as_str(self) -> &'static str { self.into() }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
  pub vote_id:   Uuid,
  pub bill_id:   Uuid,
  pub member_id: Uuid,
  pub chamber:   Chamber,
  pub position:  VotePosition,
  pub cast_on:   Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct NewVote {
  pub bill_id:   Uuid,
  pub member_id: Uuid,
  pub chamber:   Chamber,
  pub position:  VotePosition,
  pub cast_on:   Option<NaiveDate>,
}

// ─── Positions ───────────────────────────────────────────────────────────────

/// A user's stance on a bill: positive supports, negative opposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
  pub position_id: Uuid,
  pub bill_id:     Uuid,
  pub user_id:     Uuid,
  pub value:       i32,
  pub recorded_at: DateTime<Utc>,
}
