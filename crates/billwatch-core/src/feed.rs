//! The external legislative feed seam.
//!
//! [`FeedRecord`] is the feed-agnostic shape of one upstream bill. The
//! `apply_*` methods are the only place feed attributes are copied onto a
//! [`Bill`], one named field at a time.

use std::future::Future;

use chrono::NaiveDate;

use crate::bill::Bill;

/// One bill as reported by the upstream feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedRecord {
  pub congress:               u32,
  /// May carry punctuation, e.g. `"H.R.1234"`.
  pub number:                 String,
  pub title:                  String,
  pub summary:                Option<String>,
  pub full_text_url:          Option<String>,

  pub introduced_on:          Option<NaiveDate>,
  pub house_voted_on:         Option<NaiveDate>,
  pub senate_voted_on:        Option<NaiveDate>,
  pub enacted_on:             Option<NaiveDate>,
  pub vetoed_on:              Option<NaiveDate>,

  pub house_result:           Option<String>,
  pub senate_result:          Option<String>,

  pub committee_bioguide_ids: Vec<String>,
  pub tag_names:              Vec<String>,
  pub sponsor_bioguide_id:    Option<String>,
  pub cosponsor_bioguide_ids: Vec<String>,

  /// Decided by the feed client; the engine only filters on it.
  pub relevant:               bool,
}

impl FeedRecord {
  pub fn is_relevant(&self) -> bool { self.relevant }

  /// Overwrite the descriptive fields unconditionally.
  pub fn apply_core_fields(&self, bill: &mut Bill) {
    bill.number = self.number.clone();
    bill.title = self.title.clone();
    bill.summary = self.summary.clone();
    bill.full_text_url = self.full_text_url.clone();
  }

  /// Fill each timeline date only where the bill has none yet.
  pub fn apply_timeline_first_write(&self, bill: &mut Bill) {
    fill(&mut bill.introduced_on, self.introduced_on);
    fill(&mut bill.house_voted_on, self.house_voted_on);
    fill(&mut bill.senate_voted_on, self.senate_voted_on);
    fill(&mut bill.enacted_on, self.enacted_on);
    fill(&mut bill.vetoed_on, self.vetoed_on);
  }

  /// Overwrite every feed-sourced attribute, including clearing values the
  /// feed no longer reports.
  pub fn apply_all(&self, bill: &mut Bill) {
    self.apply_core_fields(bill);
    bill.introduced_on = self.introduced_on;
    bill.house_voted_on = self.house_voted_on;
    bill.senate_voted_on = self.senate_voted_on;
    bill.enacted_on = self.enacted_on;
    bill.vetoed_on = self.vetoed_on;
    bill.house_result = self.house_result.clone();
    bill.senate_result = self.senate_result.clone();
  }
}

fn fill(slot: &mut Option<NaiveDate>, incoming: Option<NaiveDate>) {
  if slot.is_none() {
    *slot = incoming;
  }
}

/// Abstraction over an upstream source of bill records.
pub trait BillFeed: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Recently active bills, relevant or not.
  fn fetch_recent(
    &self,
  ) -> impl Future<Output = Result<Vec<FeedRecord>, Self::Error>> + Send + '_;

  /// A single bill by congress and its letters-and-digits number.
  fn fetch_one<'a>(
    &'a self,
    congress: u32,
    number: &'a str,
  ) -> impl Future<Output = Result<FeedRecord, Self::Error>> + Send + 'a;
}
