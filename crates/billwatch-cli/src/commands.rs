//! Subcommand implementations.

use anyhow::{Context as _, Result, anyhow, bail};
use billwatch_core::{
  bill::{Bill, FeatureState},
  reference::{NewCommittee, NewMember},
  status::StageStatus,
  store::{BillQuery, BillStore},
};
use billwatch_feed::ProPublicaFeed;
use billwatch_store_sqlite::SqliteStore;
use billwatch_sync::{BillReport, SyncEngine, UpsertOutcome, report::PartyBreakdown};
use chrono::Utc;

pub type Engine = SyncEngine<ProPublicaFeed, SqliteStore, SqliteStore>;

async fn load_bill(store: &SqliteStore, congress: u32, number: &str) -> Result<Bill> {
  store
    .find_bill(congress, number)
    .await?
    .ok_or_else(|| anyhow!("no bill {number} in congress {congress}"))
}

// ─── Sync ────────────────────────────────────────────────────────────────────

pub async fn sync(engine: &Engine) -> Result<()> {
  let run = engine.sync_all().await.context("sync failed")?;
  println!(
    "run {} completed: {} relevant records, {} synced",
    run.run_id, run.records_seen, run.records_synced
  );
  Ok(())
}

pub async fn refresh(engine: &Engine, congress: u32, number: &str) -> Result<()> {
  let bill = load_bill(engine.store(), congress, number).await?;
  let outcome = engine
    .refresh_one(&bill)
    .await
    .with_context(|| format!("refreshing {bill}"))?;
  print_outcome(&outcome);
  Ok(())
}

fn print_outcome(outcome: &UpsertOutcome) {
  let changed: Vec<String> = outcome.changes.iter().map(|c| c.to_string()).collect();
  println!("{}: {}", outcome.bill, outcome.bill.title);
  if changed.is_empty() {
    println!("  no changes");
  } else {
    println!("  changed: {}", changed.join(", "));
  }
  for kind in &outcome.notified {
    println!("  scheduled: {kind}");
  }
}

// ─── Status ──────────────────────────────────────────────────────────────────

pub async fn status(
  store:    &SqliteStore,
  congress: u32,
  number:   &str,
  party:    Option<&str>,
  json:     bool,
) -> Result<()> {
  let bill = load_bill(store, congress, number).await?;
  let report = BillReport::gather(store, bill, party).await?;

  if json {
    println!("{}", serde_json::to_string_pretty(&report)?);
    return Ok(());
  }

  println!("{}: {}", report.bill, report.bill.title);
  if let Some(tag) = &report.primary_tag {
    println!("  subject: {}", tag.name);
  }
  if let Some(sponsor) = &report.sponsor {
    println!(
      "  sponsor: {} ({} cosponsors)",
      sponsor.name.as_deref().unwrap_or(&sponsor.bioguide_id),
      report.cosponsors.len()
    );
  }
  for (stage, status) in &report.status {
    println!("  {stage:<10} {}", stage_label(status));
  }
  println!(
    "  positions: {} up ({}), {} down ({}), {} followers",
    report.tally.upvote_count(),
    report.upvote_percentage.as_deref().unwrap_or("n/a"),
    report.tally.downvote_count(),
    report.downvote_percentage.as_deref().unwrap_or("n/a"),
    report.followers,
  );
  if let Some(party) = &report.party {
    for (chamber, breakdown) in [("house", report.house), ("senate", report.senate)] {
      if let Some(b) = breakdown {
        println!("  {chamber} ({party}): {}", breakdown_line(&b));
      }
    }
  }
  Ok(())
}

fn stage_label(status: &StageStatus) -> &str {
  match status {
    StageStatus::Contradictory => "-- (enacted and vetoed)",
    other => other.as_str().unwrap_or("--"),
  }
}

fn breakdown_line(b: &PartyBreakdown) -> String {
  format!(
    "{} yes, {} no, {} present, {} not voting",
    b.yes, b.no, b.present, b.not_voting
  )
}

// ─── Listing ─────────────────────────────────────────────────────────────────

pub async fn bills(store: &SqliteStore, query: BillQuery) -> Result<()> {
  let bills = store.list_bills(&query).await?;
  if bills.is_empty() {
    println!("no bills");
  }
  for bill in bills {
    let introduced = bill
      .introduced_on
      .map(|d| d.to_string())
      .unwrap_or_else(|| "----------".into());
    let marker = if bill.is_special() { "*" } else { " " };
    println!("{marker} {introduced}  {:<12} {}", bill.number, bill.title);
  }
  Ok(())
}

pub async fn notifications(store: &SqliteStore, due_only: bool) -> Result<()> {
  let due_at = due_only.then(Utc::now);
  let rows = store.pending_notifications(due_at).await?;
  if rows.is_empty() {
    println!("no notifications");
  }
  for n in rows {
    println!(
      "{}  {:<20} {} {}  deliver after {}",
      n.notification_id, n.kind, n.entity_type, n.entity_id, n.deliver_after
    );
  }
  Ok(())
}

pub async fn runs(store: &SqliteStore, limit: usize) -> Result<()> {
  for run in store.recent_sync_runs(limit).await? {
    let finished = run
      .finished_at
      .map(|t| t.to_rfc3339())
      .unwrap_or_else(|| "running".into());
    let error = match &run.outcome {
      billwatch_core::sync_run::SyncOutcome::Failed { error } => format!("  {error}"),
      _ => String::new(),
    };
    println!(
      "{}  {}  {} → {}  {}/{}{}",
      run.run_id,
      run.outcome.status_str(),
      run.started_at.to_rfc3339(),
      finished,
      run.records_synced,
      run.records_seen,
      error,
    );
  }
  Ok(())
}

// ─── Administration ──────────────────────────────────────────────────────────

pub async fn add_member(
  store:       &SqliteStore,
  bioguide_id: String,
  name:        Option<String>,
  party:       Option<String>,
) -> Result<()> {
  let member = store
    .upsert_member(NewMember { bioguide_id, name, party })
    .await?;
  println!("member {} ({})", member.bioguide_id, member.member_id);
  Ok(())
}

pub async fn add_committee(
  store:       &SqliteStore,
  bioguide_id: String,
  name:        Option<String>,
) -> Result<()> {
  let committee = store
    .upsert_committee(NewCommittee { bioguide_id, name })
    .await?;
  println!("committee {} ({})", committee.bioguide_id, committee.committee_id);
  Ok(())
}

pub async fn feature(
  store:    &SqliteStore,
  congress: u32,
  number:   &str,
  state:    &str,
  position: Option<i64>,
) -> Result<()> {
  let state = FeatureState::parse(state)?;
  let bill = load_bill(store, congress, number).await?;
  store.set_feature(bill.bill_id, state, position).await?;
  println!("{bill}: {state}");
  Ok(())
}

pub async fn set_visible(
  store:    &SqliteStore,
  congress: u32,
  number:   &str,
  visible:  bool,
) -> Result<()> {
  let bill = load_bill(store, congress, number).await?;
  store.set_visible(bill.bill_id, visible).await?;
  println!("{bill}: {}", if visible { "visible" } else { "hidden" });
  Ok(())
}

pub async fn delete(store: &SqliteStore, congress: u32, number: &str, yes: bool) -> Result<()> {
  if !yes {
    bail!("refusing to delete {number} without --yes");
  }
  let bill = load_bill(store, congress, number).await?;
  store.delete_bill(bill.bill_id).await?;
  tracing::info!(bill = %bill, congress, "bill deleted");
  println!("deleted {bill}");
  Ok(())
}
