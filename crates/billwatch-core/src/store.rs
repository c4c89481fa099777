//! The `BillStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g.
//! `billwatch-store-sqlite`). The sync engine and the CLI depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  activity::{Chamber, VotePosition},
  bill::Bill,
  reference::{Committee, Congress, Member, Tag},
  status::PositionTally,
  sync_run::{SyncKind, SyncRun},
};

// ─── Query type ──────────────────────────────────────────────────────────────

/// Parameters for [`BillStore::list_bills`].
#[derive(Debug, Clone, Default)]
pub struct BillQuery {
  /// Case-insensitive substring match over number, title and summary.
  pub text:          Option<String>,
  pub congress:      Option<u32>,
  /// Only bills with `is_visible` set.
  pub visible_only:  bool,
  /// Only featured or highlighted bills, ordered by feature position.
  /// Otherwise results are ordered by introduction date, newest first.
  pub special_only:  bool,
  pub limit:         Option<usize>,
  pub offset:        Option<usize>,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the relational store behind bills and their reference
/// data.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait BillStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Reference data ────────────────────────────────────────────────────

  fn find_or_create_congress(
    &self,
    number: u32,
  ) -> impl Future<Output = Result<Congress, Self::Error>> + Send + '_;

  fn get_congress(
    &self,
    congress_id: Uuid,
  ) -> impl Future<Output = Result<Option<Congress>, Self::Error>> + Send + '_;

  fn find_or_create_tag<'a>(
    &'a self,
    name: &'a str,
  ) -> impl Future<Output = Result<Tag, Self::Error>> + Send + 'a;

  /// Returns `None` if no committee has this bioguide id.
  fn find_committee<'a>(
    &'a self,
    bioguide_id: &'a str,
  ) -> impl Future<Output = Result<Option<Committee>, Self::Error>> + Send + 'a;

  /// Returns `None` if no member has this bioguide id.
  fn find_member<'a>(
    &'a self,
    bioguide_id: &'a str,
  ) -> impl Future<Output = Result<Option<Member>, Self::Error>> + Send + 'a;

  /// All members whose bioguide id is in `bioguide_ids`; unknown ids are
  /// skipped.
  fn find_members<'a>(
    &'a self,
    bioguide_ids: &'a [String],
  ) -> impl Future<Output = Result<Vec<Member>, Self::Error>> + Send + 'a;

  // ── Bills ─────────────────────────────────────────────────────────────

  /// Load the bill with this number in `congress`, or build an unsaved one.
  /// The number is compared in canonical form, case-insensitively.
  fn find_or_initialize_bill<'a>(
    &'a self,
    congress: &'a Congress,
    number: &'a str,
  ) -> impl Future<Output = Result<Bill, Self::Error>> + Send + 'a;

  /// Validate and persist every column of `bill`, returning the stored row.
  ///
  /// Fails if the title is blank or another bill in the same congress
  /// already has this number.
  fn save_bill(
    &self,
    bill: Bill,
  ) -> impl Future<Output = Result<Bill, Self::Error>> + Send + '_;

  /// Stamp `deep_scraped_on` (and `updated_at`) without a full save.
  fn touch_deep_scraped(
    &self,
    bill_id: Uuid,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_bill(
    &self,
    bill_id: Uuid,
  ) -> impl Future<Output = Result<Option<Bill>, Self::Error>> + Send + '_;

  fn find_bill<'a>(
    &'a self,
    congress: u32,
    number: &'a str,
  ) -> impl Future<Output = Result<Option<Bill>, Self::Error>> + Send + 'a;

  fn list_bills<'a>(
    &'a self,
    query: &'a BillQuery,
  ) -> impl Future<Output = Result<Vec<Bill>, Self::Error>> + Send + 'a;

  // ── Associations ──────────────────────────────────────────────────────

  /// Associate a committee; associating it twice is a no-op.
  fn add_committee(
    &self,
    bill_id: Uuid,
    committee_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Associate a tag; associating it twice is a no-op.
  fn add_tag(
    &self,
    bill_id: Uuid,
    tag_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Replace the primary sponsorship. `None` removes it.
  fn set_sponsor(
    &self,
    bill_id: Uuid,
    member_id: Option<Uuid>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Replace the cosponsor set with exactly `member_ids`.
  fn set_cosponsors(
    &self,
    bill_id: Uuid,
    member_ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  /// Tags in association order; the first one is the bill's primary tag.
  fn bill_tags(
    &self,
    bill_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Tag>, Self::Error>> + Send + '_;

  fn bill_committees(
    &self,
    bill_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Committee>, Self::Error>> + Send + '_;

  fn sponsor(
    &self,
    bill_id: Uuid,
  ) -> impl Future<Output = Result<Option<Member>, Self::Error>> + Send + '_;

  fn cosponsors(
    &self,
    bill_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Member>, Self::Error>> + Send + '_;

  /// Votes on the bill in `chamber` at `position` cast by members of
  /// `party`.
  fn vote_breakdown<'a>(
    &'a self,
    bill_id: Uuid,
    chamber: Chamber,
    position: VotePosition,
    party: &'a str,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + 'a;

  fn position_tally(
    &self,
    bill_id: Uuid,
  ) -> impl Future<Output = Result<PositionTally, Self::Error>> + Send + '_;

  fn follower_count(
    &self,
    bill_id: Uuid,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Sync runs ─────────────────────────────────────────────────────────

  /// Open a run of `kind`. Fails while another run of the same kind is
  /// still open.
  fn begin_sync_run(
    &self,
    kind: SyncKind,
  ) -> impl Future<Output = Result<SyncRun, Self::Error>> + Send + '_;

  /// Persist the outcome and counts of a finished run.
  fn finish_sync_run(
    &self,
    run: SyncRun,
  ) -> impl Future<Output = Result<SyncRun, Self::Error>> + Send + '_;

  /// Most recent runs first.
  fn recent_sync_runs(
    &self,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<SyncRun>, Self::Error>> + Send + '_;
}
