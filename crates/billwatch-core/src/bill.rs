//! The bill entity and its change tracking.
//!
//! A [`Bill`] is identified by `(congress, number)`. The number is always
//! stored in canonical form (periods stripped), so `"H.R.1234"` and
//! `"HR1234"` name the same bill; the comparison is case-insensitive.

use std::{collections::BTreeSet, fmt};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Number helpers ──────────────────────────────────────────────────────────

/// Canonical stored form of a bill number: periods removed.
pub fn canonical_number(raw: &str) -> String { raw.replace('.', "") }

/// The feed lookup key for a bill number: letters and digits only.
pub fn feed_slug(number: &str) -> String {
  number.chars().filter(|c| c.is_alphanumeric()).collect()
}

// ─── Feature state ───────────────────────────────────────────────────────────

/// Editorial promotion of a bill on listing pages.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FeatureState {
  #[default]
  Unfeatured,
  Featured,
  Highlighted,
}

impl FeatureState {
  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownFeatureState(s.to_owned()))
  }

  pub fn as_str(self) -> &'static str { self.into() }
}

// ─── Columns ─────────────────────────────────────────────────────────────────

/// The persisted bill columns whose changes are tracked across a save.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BillColumn {
  Number,
  Title,
  Summary,
  FullTextUrl,
  IntroducedOn,
  HouseVotedOn,
  SenateVotedOn,
  EnactedOn,
  VetoedOn,
  HouseResult,
  SenateResult,
}

/// The set of columns a save modified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillChanges(BTreeSet<BillColumn>);

impl BillChanges {
  pub fn contains(&self, column: BillColumn) -> bool { self.0.contains(&column) }

  pub fn insert(&mut self, column: BillColumn) { self.0.insert(column); }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn len(&self) -> usize { self.0.len() }

  pub fn iter(&self) -> impl Iterator<Item = BillColumn> + '_ {
    self.0.iter().copied()
  }
}

impl FromIterator<BillColumn> for BillChanges {
  fn from_iter<I: IntoIterator<Item = BillColumn>>(iter: I) -> Self {
    Self(iter.into_iter().collect())
  }
}

// ─── Bill ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
  pub bill_id:          Uuid,
  pub congress_id:      Uuid,
  pub number:           String,
  pub title:            String,
  pub summary:          Option<String>,
  pub full_text_url:    Option<String>,

  pub introduced_on:    Option<NaiveDate>,
  pub house_voted_on:   Option<NaiveDate>,
  pub senate_voted_on:  Option<NaiveDate>,
  pub enacted_on:       Option<NaiveDate>,
  pub vetoed_on:        Option<NaiveDate>,

  /// Raw chamber outcome as reported by the feed, e.g. `"passed"`.
  pub house_result:     Option<String>,
  pub senate_result:    Option<String>,

  /// Set once the one-time enrichment (committees, tags, sponsors) has run.
  pub deep_scraped_on:  Option<DateTime<Utc>>,

  pub feature_state:    FeatureState,
  pub feature_position: Option<i64>,
  pub is_visible:       bool,

  /// `None` until the bill has been saved for the first time.
  pub created_at:       Option<DateTime<Utc>>,
  pub updated_at:       Option<DateTime<Utc>>,
}

impl Bill {
  /// A fresh, unsaved bill for `congress_id` with only its number set.
  pub fn initialize(congress_id: Uuid, number: &str) -> Self {
    Self {
      bill_id: Uuid::new_v4(),
      congress_id,
      number: canonical_number(number),
      title: String::new(),
      summary: None,
      full_text_url: None,
      introduced_on: None,
      house_voted_on: None,
      senate_voted_on: None,
      enacted_on: None,
      vetoed_on: None,
      house_result: None,
      senate_result: None,
      deep_scraped_on: None,
      feature_state: FeatureState::default(),
      feature_position: None,
      is_visible: true,
      created_at: None,
      updated_at: None,
    }
  }

  pub fn is_persisted(&self) -> bool { self.created_at.is_some() }

  pub fn is_special(&self) -> bool {
    matches!(
      self.feature_state,
      FeatureState::Featured | FeatureState::Highlighted
    )
  }

  /// Columns whose values differ between `before` and `self`.
  pub fn changes_since(&self, before: &Bill) -> BillChanges {
    let mut changes = BillChanges::default();
    let mut track = |changed: bool, column: BillColumn| {
      if changed {
        changes.insert(column);
      }
    };

    track(self.number != before.number, BillColumn::Number);
    track(self.title != before.title, BillColumn::Title);
    track(self.summary != before.summary, BillColumn::Summary);
    track(self.full_text_url != before.full_text_url, BillColumn::FullTextUrl);
    track(self.introduced_on != before.introduced_on, BillColumn::IntroducedOn);
    track(self.house_voted_on != before.house_voted_on, BillColumn::HouseVotedOn);
    track(
      self.senate_voted_on != before.senate_voted_on,
      BillColumn::SenateVotedOn,
    );
    track(self.enacted_on != before.enacted_on, BillColumn::EnactedOn);
    track(self.vetoed_on != before.vetoed_on, BillColumn::VetoedOn);
    track(self.house_result != before.house_result, BillColumn::HouseResult);
    track(self.senate_result != before.senate_result, BillColumn::SenateResult);

    changes
  }
}

impl fmt::Display for Bill {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.number)
  }
}
