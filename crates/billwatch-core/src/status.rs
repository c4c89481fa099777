//! Derived bill status and position aggregates.
//!
//! Everything here is computed from persisted fields on demand; nothing is
//! cached on the bill.

use serde::{Serialize, Serializer};

use crate::bill::Bill;

// ─── Stages ──────────────────────────────────────────────────────────────────

/// A step on a bill's path to becoming law, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
pub enum Stage {
  Intro,
  House,
  Senate,
  President,
}

impl Stage {
  pub const ALL: [Stage; 4] =
    [Stage::Intro, Stage::House, Stage::Senate, Stage::President];
}

/// The outcome of a single stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageStatus {
  Passed,
  Failed,
  /// A chamber result the feed reported that is neither passed nor failed.
  Reported(String),
  /// The stage has not been reached or no result is known.
  Pending,
  /// Enacted and vetoed are both recorded; neither outcome is reported.
  Contradictory,
}

impl StageStatus {
  /// Interpret a raw chamber result string from the feed.
  pub fn from_result(result: Option<&str>) -> Self {
    match result {
      None => Self::Pending,
      Some("passed") => Self::Passed,
      Some("failed") => Self::Failed,
      Some(other) => Self::Reported(other.to_owned()),
    }
  }

  /// Display value; `None` for stages with no reportable outcome.
  pub fn as_str(&self) -> Option<&str> {
    match self {
      Self::Passed => Some("passed"),
      Self::Failed => Some("failed"),
      Self::Reported(s) => Some(s),
      Self::Pending | Self::Contradictory => None,
    }
  }
}

impl Serialize for StageStatus {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self.as_str() {
      Some(s) => serializer.serialize_str(s),
      None => serializer.serialize_none(),
    }
  }
}

impl Bill {
  /// A bill that exists has been introduced.
  pub fn intro_status(&self) -> StageStatus { StageStatus::Passed }

  pub fn house_status(&self) -> StageStatus {
    if self.enacted_on.is_some() {
      StageStatus::Passed
    } else {
      StageStatus::from_result(self.house_result.as_deref())
    }
  }

  pub fn senate_status(&self) -> StageStatus {
    if self.enacted_on.is_some() {
      StageStatus::Passed
    } else {
      StageStatus::from_result(self.senate_result.as_deref())
    }
  }

  pub fn president_status(&self) -> StageStatus {
    match (self.enacted_on.is_some(), self.vetoed_on.is_some()) {
      (true, false) => StageStatus::Passed,
      (false, true) => StageStatus::Failed,
      (true, true) => StageStatus::Contradictory,
      (false, false) => StageStatus::Pending,
    }
  }

  pub fn stage_status(&self, stage: Stage) -> StageStatus {
    match stage {
      Stage::Intro => self.intro_status(),
      Stage::House => self.house_status(),
      Stage::Senate => self.senate_status(),
      Stage::President => self.president_status(),
    }
  }

  /// Every stage with its status, in Intro, House, Senate, President order.
  pub fn status(&self) -> [(Stage, StageStatus); 4] {
    Stage::ALL.map(|stage| (stage, self.stage_status(stage)))
  }
}

// ─── Positions ───────────────────────────────────────────────────────────────

/// Counts of user positions on a bill, split by sign.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PositionTally {
  pub upvotes:   u64,
  pub downvotes: u64,
  /// Positions recorded with value zero; excluded from percentages.
  pub neutral:   u64,
}

impl PositionTally {
  pub fn from_values(values: impl IntoIterator<Item = i32>) -> Self {
    values.into_iter().fold(Self::default(), |mut tally, value| {
      match value.signum() {
        1 => tally.upvotes += 1,
        -1 => tally.downvotes += 1,
        _ => tally.neutral += 1,
      }
      tally
    })
  }

  pub fn upvote_count(&self) -> u64 { self.upvotes }

  pub fn downvote_count(&self) -> u64 { self.downvotes }

  /// Upvotes plus downvotes; neutral positions are not counted.
  pub fn total_positions(&self) -> u64 { self.upvotes + self.downvotes }

  pub fn upvote_percentage(&self) -> Option<String> {
    self.percentage_of(self.upvotes)
  }

  pub fn downvote_percentage(&self) -> Option<String> {
    self.percentage_of(self.downvotes)
  }

  fn percentage_of(&self, count: u64) -> Option<String> {
    let total = self.total_positions();
    if total == 0 {
      return None;
    }
    let percent = (count as f64 / total as f64 * 100.0).round() as u64;
    Some(format!("{percent}%"))
  }
}
