//! Read-side view of one bill: stage statuses, audience positions, vote
//! breakdowns and associations, gathered from a [`BillStore`].

use billwatch_core::{
  activity::{Chamber, VotePosition},
  bill::Bill,
  reference::{Committee, Member, Tag},
  status::{PositionTally, Stage, StageStatus},
  store::BillStore,
};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{Result, SyncError};

/// Votes cast by one party in one chamber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PartyBreakdown {
  pub yes:        u64,
  pub no:         u64,
  pub present:    u64,
  pub not_voting: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BillReport {
  pub bill:                Bill,
  pub status:              Vec<(Stage, StageStatus)>,
  pub tally:               PositionTally,
  pub upvote_percentage:   Option<String>,
  pub downvote_percentage: Option<String>,
  pub followers:           u64,
  pub primary_tag:         Option<Tag>,
  pub tags:                Vec<Tag>,
  pub committees:          Vec<Committee>,
  pub sponsor:             Option<Member>,
  pub cosponsors:          Vec<Member>,
  /// Set when the report was gathered for a party.
  pub party:               Option<String>,
  pub house:               Option<PartyBreakdown>,
  pub senate:              Option<PartyBreakdown>,
}

impl BillReport {
  pub async fn gather<S: BillStore>(
    store: &S,
    bill:  Bill,
    party: Option<&str>,
  ) -> Result<Self> {
    let id = bill.bill_id;
    let tally = store.position_tally(id).await.map_err(SyncError::store)?;
    let tags = store.bill_tags(id).await.map_err(SyncError::store)?;

    let (house, senate) = match party {
      Some(party) => (
        Some(party_breakdown(store, id, Chamber::House, party).await?),
        Some(party_breakdown(store, id, Chamber::Senate, party).await?),
      ),
      None => (None, None),
    };

    Ok(Self {
      status: bill.status().to_vec(),
      upvote_percentage: tally.upvote_percentage(),
      downvote_percentage: tally.downvote_percentage(),
      tally,
      followers: store.follower_count(id).await.map_err(SyncError::store)?,
      primary_tag: tags.first().cloned(),
      tags,
      committees: store.bill_committees(id).await.map_err(SyncError::store)?,
      sponsor: store.sponsor(id).await.map_err(SyncError::store)?,
      cosponsors: store.cosponsors(id).await.map_err(SyncError::store)?,
      party: party.map(str::to_owned),
      house,
      senate,
      bill,
    })
  }
}

/// The first tag attached to the bill, if any.
pub async fn primary_tag<S: BillStore>(store: &S, bill_id: Uuid) -> Result<Option<Tag>> {
  let tags = store.bill_tags(bill_id).await.map_err(SyncError::store)?;
  Ok(tags.into_iter().next())
}

/// House votes on the bill at `position` by members of `party`.
pub async fn house_vote_breakdown<S: BillStore>(
  store:    &S,
  bill_id:  Uuid,
  position: VotePosition,
  party:    &str,
) -> Result<u64> {
  store
    .vote_breakdown(bill_id, Chamber::House, position, party)
    .await
    .map_err(SyncError::store)
}

/// Senate votes on the bill at `position` by members of `party`.
pub async fn senate_vote_breakdown<S: BillStore>(
  store:    &S,
  bill_id:  Uuid,
  position: VotePosition,
  party:    &str,
) -> Result<u64> {
  store
    .vote_breakdown(bill_id, Chamber::Senate, position, party)
    .await
    .map_err(SyncError::store)
}

async fn party_breakdown<S: BillStore>(
  store:   &S,
  bill_id: Uuid,
  chamber: Chamber,
  party:   &str,
) -> Result<PartyBreakdown> {
  let mut counts = [0u64; 4];
  let positions = [
    VotePosition::Yes,
    VotePosition::No,
    VotePosition::Present,
    VotePosition::NotVoting,
  ];
  for (slot, position) in counts.iter_mut().zip(positions) {
    *slot = store
      .vote_breakdown(bill_id, chamber, position, party)
      .await
      .map_err(SyncError::store)?;
  }

  let [yes, no, present, not_voting] = counts;
  Ok(PartyBreakdown { yes, no, present, not_voting })
}
