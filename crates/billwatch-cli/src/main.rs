//! `billwatch`: operator CLI for the bill sync engine.
//!
//! Reads `config.toml` (or the path given with `--config`), opens the SQLite
//! store, and runs one command.
//!
//! ```text
//! billwatch sync
//! billwatch status 118 HR1234 --party D
//! billwatch bills --search water
//! ```

mod commands;
mod config;

use std::path::PathBuf;

use anyhow::Context as _;
use billwatch_core::store::BillQuery;
use billwatch_feed::ProPublicaFeed;
use billwatch_store_sqlite::SqliteStore;
use billwatch_sync::{SyncEngine, SyncOptions};
use clap::{Parser, Subcommand};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;

#[derive(Parser)]
#[command(author, version, about = "Congressional bill sync and status")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Pull recent bills from the feed and upsert the relevant ones.
  Sync,

  /// Re-fetch one bill and overwrite its feed attributes.
  Refresh { congress: u32, number: String },

  /// Show stage statuses, positions and vote breakdowns for a bill.
  Status {
    congress: u32,
    number:   String,
    /// Party code for the house and senate vote breakdown.
    #[arg(long)]
    party:    Option<String>,
    #[arg(long)]
    json:     bool,
  },

  /// List bills, newest introduced first.
  Bills {
    /// Substring of number, title or summary.
    #[arg(long)]
    search:   Option<String>,
    #[arg(long)]
    congress: Option<u32>,
    /// Featured and highlighted bills, by feature position.
    #[arg(long)]
    special:  bool,
    /// Include hidden bills.
    #[arg(long)]
    all:      bool,
    #[arg(long, default_value_t = 50)]
    limit:    usize,
  },

  /// List scheduled change notifications.
  Notifications {
    /// Only those deliverable now.
    #[arg(long)]
    due: bool,
  },

  /// List recent sync runs.
  Runs {
    #[arg(long, default_value_t = 10)]
    limit: usize,
  },

  /// Add or update a member of Congress.
  AddMember {
    bioguide_id: String,
    #[arg(long)]
    name:        Option<String>,
    #[arg(long)]
    party:       Option<String>,
  },

  /// Add or update a committee.
  AddCommittee {
    code: String,
    #[arg(long)]
    name: Option<String>,
  },

  /// Set a bill's feature state (`unfeatured`, `featured`, `highlighted`).
  Feature {
    congress: u32,
    number:   String,
    state:    String,
    #[arg(long)]
    position: Option<i64>,
  },

  /// Hide or show a bill.
  Visible {
    congress: u32,
    number:   String,
    #[arg(action = clap::ArgAction::Set)]
    visible:  bool,
  },

  /// Delete a bill and everything recorded against it.
  Delete {
    congress: u32,
    number:   String,
    #[arg(long)]
    yes:      bool,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let app_cfg = AppConfig::load(&cli.config)?;

  let store_path = app_cfg.resolved_store_path();
  if let Some(parent) = store_path.parent() {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?
    .with_stale_run_after(app_cfg.stale_run_after());

  match cli.command {
    Command::Sync => commands::sync(&engine(&app_cfg, &store)?).await,
    Command::Refresh { congress, number } => {
      commands::refresh(&engine(&app_cfg, &store)?, congress, &number).await
    }
    Command::Status { congress, number, party, json } => {
      commands::status(&store, congress, &number, party.as_deref(), json).await
    }
    Command::Bills { search, congress, special, all, limit } => {
      let query = BillQuery {
        text: search,
        congress,
        visible_only: !all,
        special_only: special,
        limit: Some(limit),
        offset: None,
      };
      commands::bills(&store, query).await
    }
    Command::Notifications { due } => commands::notifications(&store, due).await,
    Command::Runs { limit } => commands::runs(&store, limit).await,
    Command::AddMember { bioguide_id, name, party } => {
      commands::add_member(&store, bioguide_id, name, party).await
    }
    Command::AddCommittee { code, name } => {
      commands::add_committee(&store, code, name).await
    }
    Command::Feature { congress, number, state, position } => {
      commands::feature(&store, congress, &number, &state, position).await
    }
    Command::Visible { congress, number, visible } => {
      commands::set_visible(&store, congress, &number, visible).await
    }
    Command::Delete { congress, number, yes } => {
      commands::delete(&store, congress, &number, yes).await
    }
  }
}

fn engine(app_cfg: &AppConfig, store: &SqliteStore) -> anyhow::Result<commands::Engine> {
  if app_cfg.feed.api_key.is_empty() {
    tracing::warn!("feed.api_key is empty; upstream requests will be rejected");
  }
  let feed = ProPublicaFeed::new(app_cfg.feed.clone()).context("failed to build feed client")?;
  Ok(
    SyncEngine::new(feed, store.clone(), store.clone()).with_options(SyncOptions {
      notification_delay: app_cfg.notification_delay(),
    }),
  )
}
