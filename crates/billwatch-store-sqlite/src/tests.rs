//! Integration tests for `SqliteStore` against an in-memory database.

use std::time::Duration;

use billwatch_core::{
  activity::{Chamber, NewVote, VotePosition},
  bill::{Bill, FeatureState},
  notify::{BILL_ENTITY, NotificationKind, Notifier},
  reference::{Congress, NewCommittee, NewMember},
  store::{BillQuery, BillStore},
  sync_run::{SyncKind, SyncOutcome},
};
use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

async fn saved_bill(s: &SqliteStore, congress: &Congress, number: &str) -> Bill {
  let mut bill = s.find_or_initialize_bill(congress, number).await.unwrap();
  bill.title = format!("An act numbered {number}");
  s.save_bill(bill).await.unwrap()
}

// ─── Reference data ──────────────────────────────────────────────────────────

#[tokio::test]
async fn find_or_create_congress_is_idempotent() {
  let s = store().await;
  let first = s.find_or_create_congress(118).await.unwrap();
  let second = s.find_or_create_congress(118).await.unwrap();
  assert_eq!(first, second);
  assert_eq!(first.number, 118);

  let fetched = s.get_congress(first.congress_id).await.unwrap();
  assert_eq!(fetched, Some(first));
}

#[tokio::test]
async fn find_or_create_tag_reuses_by_name() {
  let s = store().await;
  let a = s.find_or_create_tag("Health").await.unwrap();
  let b = s.find_or_create_tag("Health").await.unwrap();
  let c = s.find_or_create_tag("Energy").await.unwrap();
  assert_eq!(a.tag_id, b.tag_id);
  assert_ne!(a.tag_id, c.tag_id);
}

#[tokio::test]
async fn committees_and_members_resolve_by_bioguide_id() {
  let s = store().await;
  assert!(s.find_committee("HSJU").await.unwrap().is_none());

  let committee = s
    .upsert_committee(NewCommittee {
      bioguide_id: "HSJU".into(),
      name:        Some("Judiciary".into()),
    })
    .await
    .unwrap();
  assert_eq!(s.find_committee("HSJU").await.unwrap(), Some(committee));

  s.upsert_member(NewMember::new("A000001")).await.unwrap();
  s.upsert_member(NewMember::new("B000002")).await.unwrap();

  let found = s
    .find_members(&["B000002".into(), "Z999999".into(), "A000001".into()])
    .await
    .unwrap();
  let ids: Vec<_> = found.iter().map(|m| m.bioguide_id.as_str()).collect();
  assert_eq!(ids, vec!["A000001", "B000002"]);

  assert!(s.find_members(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn upsert_member_keeps_known_fields() {
  let s = store().await;
  let first = s
    .upsert_member(NewMember {
      bioguide_id: "A000001".into(),
      name:        Some("Ada".into()),
      party:       Some("D".into()),
    })
    .await
    .unwrap();
  let second = s.upsert_member(NewMember::new("A000001")).await.unwrap();
  assert_eq!(first.member_id, second.member_id);
  assert_eq!(second.party.as_deref(), Some("D"));
}

// ─── Bills ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn find_or_initialize_returns_unsaved_bill() {
  let s = store().await;
  let congress = s.find_or_create_congress(118).await.unwrap();

  let bill = s.find_or_initialize_bill(&congress, "H.R. 1").await.unwrap();
  assert!(!bill.is_persisted());
  assert_eq!(bill.number, "HR 1");
  assert_eq!(bill.congress_id, congress.congress_id);
}

#[tokio::test]
async fn save_then_find_round_trips_columns() {
  let s = store().await;
  let congress = s.find_or_create_congress(118).await.unwrap();

  let mut bill = s.find_or_initialize_bill(&congress, "S. 42").await.unwrap();
  bill.title = "Clean Water Act".into();
  bill.summary = Some("Keeps water clean.".into());
  bill.introduced_on = Some(date(2023, 1, 9));
  bill.house_result = Some("passed".into());
  let saved = s.save_bill(bill).await.unwrap();
  assert!(saved.is_persisted());

  let found = s.find_bill(118, "s. 42").await.unwrap().unwrap();
  assert_eq!(found.bill_id, saved.bill_id);
  assert_eq!(found.number, "S 42");
  assert_eq!(found.title, "Clean Water Act");
  assert_eq!(found.introduced_on, Some(date(2023, 1, 9)));
  assert_eq!(found.house_result.as_deref(), Some("passed"));
  assert_eq!(found.feature_state, FeatureState::Unfeatured);

  let again = s.find_or_initialize_bill(&congress, "s. 42").await.unwrap();
  assert_eq!(again.bill_id, saved.bill_id);
  assert!(again.is_persisted());
}

#[tokio::test]
async fn save_rejects_blank_title() {
  let s = store().await;
  let congress = s.find_or_create_congress(118).await.unwrap();
  let bill = s.find_or_initialize_bill(&congress, "HR 7").await.unwrap();

  let err = s.save_bill(bill).await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
  assert!(s.find_bill(118, "HR 7").await.unwrap().is_none());
}

#[tokio::test]
async fn save_rejects_duplicate_number_ignoring_case() {
  let s = store().await;
  let congress = s.find_or_create_congress(118).await.unwrap();
  saved_bill(&s, &congress, "HR 7").await;

  let mut dup = Bill::initialize(congress.congress_id, "hr 7");
  dup.title = "Impostor".into();
  let err = s.save_bill(dup).await.unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn same_number_in_another_congress_is_allowed() {
  let s = store().await;
  let c117 = s.find_or_create_congress(117).await.unwrap();
  let c118 = s.find_or_create_congress(118).await.unwrap();
  let a = saved_bill(&s, &c117, "HR 1").await;
  let b = saved_bill(&s, &c118, "HR 1").await;
  assert_ne!(a.bill_id, b.bill_id);
}

#[tokio::test]
async fn resave_keeps_created_at() {
  let s = store().await;
  let congress = s.find_or_create_congress(118).await.unwrap();
  let mut bill = saved_bill(&s, &congress, "HR 9").await;
  let created = bill.created_at;

  bill.summary = Some("Now with summary".into());
  s.save_bill(bill.clone()).await.unwrap();

  let stored = s.get_bill(bill.bill_id).await.unwrap().unwrap();
  assert_eq!(stored.created_at, created);
  assert_eq!(stored.summary.as_deref(), Some("Now with summary"));
}

#[tokio::test]
async fn saving_a_deleted_bill_does_not_recreate_it() {
  let s = store().await;
  let congress = s.find_or_create_congress(118).await.unwrap();
  let mut bill = saved_bill(&s, &congress, "HR 51").await;
  s.delete_bill(bill.bill_id).await.unwrap();

  bill.title = "Renamed".into();
  let err = s.save_bill(bill.clone()).await.unwrap_err();
  assert!(matches!(err, Error::BillNotFound(id) if id == bill.bill_id));
  assert!(s.get_bill(bill.bill_id).await.unwrap().is_none());
}

#[tokio::test]
async fn touch_deep_scraped_stamps_only_the_timestamp() {
  let s = store().await;
  let congress = s.find_or_create_congress(118).await.unwrap();
  let bill = saved_bill(&s, &congress, "HR 3").await;

  let at = Utc::now();
  s.touch_deep_scraped(bill.bill_id, at).await.unwrap();

  let stored = s.get_bill(bill.bill_id).await.unwrap().unwrap();
  let stamped = stored.deep_scraped_on.unwrap();
  assert!((stamped - at).num_milliseconds().abs() < 1);
  assert_eq!(stored.title, bill.title);

  let err = s.touch_deep_scraped(Uuid::new_v4(), at).await.unwrap_err();
  assert!(matches!(err, Error::BillNotFound(_)));
}

#[tokio::test]
async fn list_bills_orders_newest_first_and_filters() {
  let s = store().await;
  let congress = s.find_or_create_congress(118).await.unwrap();

  for (number, day) in [("HR 1", 1), ("HR 2", 3), ("HR 3", 2)] {
    let mut bill = s.find_or_initialize_bill(&congress, number).await.unwrap();
    bill.title = format!("Water bill {number}");
    bill.introduced_on = Some(date(2023, 2, day));
    s.save_bill(bill).await.unwrap();
  }
  let mut undated = s.find_or_initialize_bill(&congress, "S 5").await.unwrap();
  undated.title = "Roads".into();
  s.save_bill(undated).await.unwrap();

  let all = s.list_bills(&BillQuery::default()).await.unwrap();
  let numbers: Vec<_> = all.iter().map(|b| b.number.as_str()).collect();
  assert_eq!(numbers, vec!["HR 2", "HR 3", "HR 1", "S 5"]);

  let water = s
    .list_bills(&BillQuery { text: Some("WATER".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(water.len(), 3);

  let other = s
    .list_bills(&BillQuery { congress: Some(117), ..Default::default() })
    .await
    .unwrap();
  assert!(other.is_empty());

  let page = s
    .list_bills(&BillQuery { limit: Some(2), offset: Some(1), ..Default::default() })
    .await
    .unwrap();
  let numbers: Vec<_> = page.iter().map(|b| b.number.as_str()).collect();
  assert_eq!(numbers, vec!["HR 3", "HR 1"]);
}

#[tokio::test]
async fn search_matches_wildcards_literally() {
  let s = store().await;
  let congress = s.find_or_create_congress(118).await.unwrap();

  for (number, title) in [
    ("HR 1", "Tax_relief act"),
    ("HR 2", "100% clean energy"),
    ("HR 3", "Roads"),
  ] {
    let mut bill = s.find_or_initialize_bill(&congress, number).await.unwrap();
    bill.title = title.into();
    s.save_bill(bill).await.unwrap();
  }

  let search = |text: &str| BillQuery { text: Some(text.into()), ..Default::default() };

  let underscore = s.list_bills(&search("_")).await.unwrap();
  let numbers: Vec<_> = underscore.iter().map(|b| b.number.as_str()).collect();
  assert_eq!(numbers, vec!["HR 1"]);

  let percent = s.list_bills(&search("%")).await.unwrap();
  let numbers: Vec<_> = percent.iter().map(|b| b.number.as_str()).collect();
  assert_eq!(numbers, vec!["HR 2"]);
}

#[tokio::test]
async fn list_special_bills_by_feature_position() {
  let s = store().await;
  let congress = s.find_or_create_congress(118).await.unwrap();
  let a = saved_bill(&s, &congress, "HR 1").await;
  let b = saved_bill(&s, &congress, "HR 2").await;
  let c = saved_bill(&s, &congress, "HR 3").await;
  saved_bill(&s, &congress, "HR 4").await;

  s.set_feature(a.bill_id, FeatureState::Featured, Some(2)).await.unwrap();
  s.set_feature(b.bill_id, FeatureState::Highlighted, Some(1)).await.unwrap();
  s.set_feature(c.bill_id, FeatureState::Featured, Some(3)).await.unwrap();
  s.set_visible(c.bill_id, false).await.unwrap();

  let special = s
    .list_bills(&BillQuery { special_only: true, ..Default::default() })
    .await
    .unwrap();
  let numbers: Vec<_> = special.iter().map(|b| b.number.as_str()).collect();
  assert_eq!(numbers, vec!["HR 2", "HR 1", "HR 3"]);
  assert!(special.iter().all(Bill::is_special));

  let visible = s
    .list_bills(&BillQuery {
      special_only: true,
      visible_only: true,
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(visible.len(), 2);
}

// ─── Associations ────────────────────────────────────────────────────────────

#[tokio::test]
async fn tags_keep_association_order_and_ignore_duplicates() {
  let s = store().await;
  let congress = s.find_or_create_congress(118).await.unwrap();
  let bill = saved_bill(&s, &congress, "HR 1").await;

  let zoning = s.find_or_create_tag("Zoning").await.unwrap();
  let arts = s.find_or_create_tag("Arts").await.unwrap();
  s.add_tag(bill.bill_id, zoning.tag_id).await.unwrap();
  s.add_tag(bill.bill_id, arts.tag_id).await.unwrap();
  s.add_tag(bill.bill_id, zoning.tag_id).await.unwrap();

  let tags = s.bill_tags(bill.bill_id).await.unwrap();
  let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
  assert_eq!(names, vec!["Zoning", "Arts"]);
}

#[tokio::test]
async fn committees_attach_once() {
  let s = store().await;
  let congress = s.find_or_create_congress(118).await.unwrap();
  let bill = saved_bill(&s, &congress, "HR 1").await;
  let committee = s
    .upsert_committee(NewCommittee { bioguide_id: "SSFI".into(), name: None })
    .await
    .unwrap();

  s.add_committee(bill.bill_id, committee.committee_id).await.unwrap();
  s.add_committee(bill.bill_id, committee.committee_id).await.unwrap();
  assert_eq!(s.bill_committees(bill.bill_id).await.unwrap(), vec![committee]);
}

#[tokio::test]
async fn sponsor_is_replaced_and_cosponsors_are_exact() {
  let s = store().await;
  let congress = s.find_or_create_congress(118).await.unwrap();
  let bill = saved_bill(&s, &congress, "HR 1").await;
  let a = s.upsert_member(NewMember::new("A000001")).await.unwrap();
  let b = s.upsert_member(NewMember::new("B000002")).await.unwrap();
  let c = s.upsert_member(NewMember::new("C000003")).await.unwrap();

  s.set_sponsor(bill.bill_id, Some(a.member_id)).await.unwrap();
  s.set_sponsor(bill.bill_id, Some(b.member_id)).await.unwrap();
  assert_eq!(s.sponsor(bill.bill_id).await.unwrap(), Some(b.clone()));

  s.set_cosponsors(bill.bill_id, vec![a.member_id, c.member_id, a.member_id])
    .await
    .unwrap();
  let cos = s.cosponsors(bill.bill_id).await.unwrap();
  assert_eq!(cos, vec![a.clone(), c.clone()]);

  s.set_cosponsors(bill.bill_id, vec![c.member_id]).await.unwrap();
  assert_eq!(s.cosponsors(bill.bill_id).await.unwrap(), vec![c]);
  assert_eq!(s.sponsor(bill.bill_id).await.unwrap(), Some(b));

  s.set_sponsor(bill.bill_id, None).await.unwrap();
  assert!(s.sponsor(bill.bill_id).await.unwrap().is_none());
}

// ─── Activity ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn vote_breakdown_counts_by_chamber_position_and_party() {
  let s = store().await;
  let congress = s.find_or_create_congress(118).await.unwrap();
  let bill = saved_bill(&s, &congress, "HR 1").await;

  let mut members = Vec::new();
  for (id, party) in [("D1", "D"), ("D2", "D"), ("R1", "R")] {
    let member = s
      .upsert_member(NewMember {
        bioguide_id: id.into(),
        name:        None,
        party:       Some(party.into()),
      })
      .await
      .unwrap();
    members.push(member);
  }

  let votes = [
    (0, Chamber::House, VotePosition::Yes),
    (1, Chamber::House, VotePosition::Yes),
    (2, Chamber::House, VotePosition::No),
    (0, Chamber::Senate, VotePosition::Yes),
  ];
  for (idx, chamber, position) in votes {
    s.record_vote(NewVote {
      bill_id: bill.bill_id,
      member_id: members[idx].member_id,
      chamber,
      position,
      cast_on: Some(date(2023, 3, 1)),
    })
    .await
    .unwrap();
  }

  let id = bill.bill_id;
  let house_yes_d = s.vote_breakdown(id, Chamber::House, VotePosition::Yes, "D");
  assert_eq!(house_yes_d.await.unwrap(), 2);
  let house_yes_r = s.vote_breakdown(id, Chamber::House, VotePosition::Yes, "R");
  assert_eq!(house_yes_r.await.unwrap(), 0);
  let house_no_r = s.vote_breakdown(id, Chamber::House, VotePosition::No, "R");
  assert_eq!(house_no_r.await.unwrap(), 1);
  let senate_yes_d = s.vote_breakdown(id, Chamber::Senate, VotePosition::Yes, "D");
  assert_eq!(senate_yes_d.await.unwrap(), 1);
}

#[tokio::test]
async fn position_tally_and_followers() {
  let s = store().await;
  let congress = s.find_or_create_congress(118).await.unwrap();
  let bill = saved_bill(&s, &congress, "HR 1").await;

  for value in [1, 3, -1, 0] {
    let position = s.record_position(bill.bill_id, Uuid::new_v4(), value).await.unwrap();
    assert_eq!(position.value, value);
  }
  let tally = s.position_tally(bill.bill_id).await.unwrap();
  assert_eq!(tally.upvote_count(), 2);
  assert_eq!(tally.downvote_count(), 1);
  assert_eq!(tally.total_positions(), 3);
  assert_eq!(tally.upvote_percentage().as_deref(), Some("67%"));

  let user = Uuid::new_v4();
  assert!(s.add_favorite(bill.bill_id, user).await.unwrap());
  assert!(!s.add_favorite(bill.bill_id, user).await.unwrap());
  assert!(s.add_favorite(bill.bill_id, Uuid::new_v4()).await.unwrap());
  assert_eq!(s.follower_count(bill.bill_id).await.unwrap(), 2);
}

#[tokio::test]
async fn empty_tally_has_no_percentages() {
  let s = store().await;
  let congress = s.find_or_create_congress(118).await.unwrap();
  let bill = saved_bill(&s, &congress, "HR 1").await;

  let tally = s.position_tally(bill.bill_id).await.unwrap();
  assert_eq!(tally.total_positions(), 0);
  assert!(tally.upvote_percentage().is_none());
}

#[tokio::test]
async fn delete_bill_cascades_to_dependents() {
  let s = store().await;
  let congress = s.find_or_create_congress(118).await.unwrap();
  let bill = saved_bill(&s, &congress, "HR 1").await;
  let member = s.upsert_member(NewMember::new("A000001")).await.unwrap();
  let tag = s.find_or_create_tag("Health").await.unwrap();

  s.add_tag(bill.bill_id, tag.tag_id).await.unwrap();
  s.set_sponsor(bill.bill_id, Some(member.member_id)).await.unwrap();
  s.record_position(bill.bill_id, Uuid::new_v4(), 1).await.unwrap();
  s.add_favorite(bill.bill_id, Uuid::new_v4()).await.unwrap();

  s.delete_bill(bill.bill_id).await.unwrap();

  assert!(s.get_bill(bill.bill_id).await.unwrap().is_none());
  assert!(s.bill_tags(bill.bill_id).await.unwrap().is_empty());
  assert!(s.sponsor(bill.bill_id).await.unwrap().is_none());
  assert_eq!(s.follower_count(bill.bill_id).await.unwrap(), 0);
  assert_eq!(s.position_tally(bill.bill_id).await.unwrap().total_positions(), 0);

  // Reference rows survive.
  assert!(s.find_member("A000001").await.unwrap().is_some());

  let err = s.delete_bill(bill.bill_id).await.unwrap_err();
  assert!(matches!(err, Error::BillNotFound(_)));
}

// ─── Notifications ───────────────────────────────────────────────────────────

#[tokio::test]
async fn schedule_writes_delayed_outbox_row() {
  let s = store().await;
  let entity = Uuid::new_v4();

  let scheduled = s
    .schedule(
      NotificationKind::BillEnacted,
      BILL_ENTITY,
      entity,
      Duration::from_secs(30),
    )
    .await
    .unwrap();
  assert_eq!(
    (scheduled.deliver_after - scheduled.enqueued_at).num_seconds(),
    30
  );

  let all = s.pending_notifications(None).await.unwrap();
  assert_eq!(all, vec![scheduled]);
  assert_eq!(all[0].entity_type, "Bill");

  let due_now = s.pending_notifications(Some(Utc::now())).await.unwrap();
  assert!(due_now.is_empty());

  let due_later = s
    .pending_notifications(Some(Utc::now() + chrono::Duration::minutes(1)))
    .await
    .unwrap();
  assert_eq!(due_later.len(), 1);
}

// ─── Sync runs ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn sync_run_lifecycle() {
  let s = store().await;

  let mut run = s.begin_sync_run(SyncKind::RecentBills).await.unwrap();
  assert!(run.is_running());

  let err = s.begin_sync_run(SyncKind::RecentBills).await.unwrap_err();
  assert!(matches!(err, Error::SyncInProgress(_)));

  run.records_seen = 4;
  run.records_synced = 3;
  run.complete(Utc::now());
  s.finish_sync_run(run.clone()).await.unwrap();

  let next = s.begin_sync_run(SyncKind::RecentBills).await.unwrap();
  assert_ne!(next.run_id, run.run_id);

  let runs = s.recent_sync_runs(10).await.unwrap();
  assert_eq!(runs.len(), 2);
  assert_eq!(runs[0].run_id, next.run_id);
  assert_eq!(runs[1].outcome, SyncOutcome::Completed);
  assert_eq!(runs[1].records_seen, 4);
  assert_eq!(runs[1].records_synced, 3);
}

#[tokio::test]
async fn failed_run_records_error() {
  let s = store().await;
  let mut run = s.begin_sync_run(SyncKind::RecentBills).await.unwrap();
  run.fail(Utc::now(), "feed unreachable");
  s.finish_sync_run(run).await.unwrap();

  let runs = s.recent_sync_runs(1).await.unwrap();
  assert_eq!(
    runs[0].outcome,
    SyncOutcome::Failed { error: "feed unreachable".into() }
  );
}

#[tokio::test]
async fn stale_open_run_is_abandoned() {
  let s = store()
    .await
    .with_stale_run_after(chrono::Duration::zero());

  let stale = s.begin_sync_run(SyncKind::RecentBills).await.unwrap();
  tokio::time::sleep(Duration::from_millis(5)).await;
  let fresh = s.begin_sync_run(SyncKind::RecentBills).await.unwrap();
  assert_ne!(stale.run_id, fresh.run_id);

  let runs = s.recent_sync_runs(10).await.unwrap();
  let old = runs.iter().find(|r| r.run_id == stale.run_id).unwrap();
  assert!(!old.is_running());
  assert!(matches!(old.outcome, SyncOutcome::Failed { .. }));
}
