//! Async HTTP client for the ProPublica Congress API.

use std::time::Duration;

use billwatch_core::{
  bill::feed_slug,
  feed::{BillFeed, FeedRecord},
};
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
  Error, Result,
  payload::{BillPayload, CosponsorPage, Envelope, RecentPage},
};

pub const DEFAULT_BASE_URL: &str = "https://api.propublica.org/congress/v1";

/// Connection settings for the upstream feed.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
  #[serde(default = "default_base_url")]
  pub base_url:         String,
  #[serde(default)]
  pub api_key:          String,
  /// Congress polled by `fetch_recent`.
  #[serde(default = "default_congress")]
  pub congress:         u32,
  /// `house`, `senate` or `both`.
  #[serde(default = "default_chamber")]
  pub chamber:          String,
  /// Listing kind: `introduced`, `updated`, `active`, `passed`, `enacted`
  /// or `vetoed`.
  #[serde(default = "default_bill_type")]
  pub bill_type:        String,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs:     u64,
  /// Issue one extra request per bill to collect its cosponsors.
  #[serde(default)]
  pub fetch_cosponsors: bool,
}

fn default_base_url() -> String { DEFAULT_BASE_URL.to_owned() }
fn default_congress() -> u32 { 118 }
fn default_chamber() -> String { "both".to_owned() }
fn default_bill_type() -> String { "updated".to_owned() }
fn default_timeout_secs() -> u64 { 30 }

impl Default for FeedConfig {
  fn default() -> Self {
    Self {
      base_url:         default_base_url(),
      api_key:          String::new(),
      congress:         default_congress(),
      chamber:          default_chamber(),
      bill_type:        default_bill_type(),
      timeout_secs:     default_timeout_secs(),
      fetch_cosponsors: false,
    }
  }
}

/// [`BillFeed`] backed by ProPublica.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ProPublicaFeed {
  client: Client,
  config: FeedConfig,
}

impl ProPublicaFeed {
  pub fn new(config: FeedConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()?;
    Ok(Self { client, config })
  }

  pub fn config(&self) -> &FeedConfig { &self.config }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  pub(crate) fn recent_url(&self) -> String {
    self.url(&format!(
      "/{}/{}/bills/{}.json",
      self.config.congress,
      self.config.chamber.to_ascii_lowercase(),
      self.config.bill_type.to_ascii_lowercase(),
    ))
  }

  pub(crate) fn bill_url(&self, congress: u32, slug: &str) -> String {
    self.url(&format!("/{congress}/bills/{slug}.json"))
  }

  pub(crate) fn cosponsors_url(&self, congress: u32, slug: &str) -> String {
    self.url(&format!("/{congress}/bills/{slug}/cosponsors.json"))
  }

  /// GET `url` and unwrap the `{"status", "results"}` envelope.
  async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<Vec<T>> {
    tracing::debug!(%url, "feed request");

    let resp = self
      .client
      .get(url)
      .header("X-API-Key", &self.config.api_key)
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      return Err(Error::Status { url: url.to_owned(), status });
    }

    let body = resp.text().await?;
    let envelope: Envelope<T> = serde_json::from_str(&body)
      .map_err(|source| Error::Decode { url: url.to_owned(), source })?;
    if !envelope.is_ok() {
      return Err(Error::Upstream {
        url:     url.to_owned(),
        message: envelope.error_message(),
      });
    }
    Ok(envelope.results)
  }

  async fn cosponsor_ids(&self, congress: u32, slug: &str) -> Result<Vec<String>> {
    let pages: Vec<CosponsorPage> = self.get(&self.cosponsors_url(congress, slug)).await?;
    Ok(
      pages
        .into_iter()
        .flat_map(|p| p.cosponsors)
        .map(|c| c.cosponsor_id)
        .collect(),
    )
  }

  async fn finish_record(&self, payload: BillPayload, congress: u32) -> Result<FeedRecord> {
    let slug = payload.slug();
    let mut record = payload.into_record(congress);
    if self.config.fetch_cosponsors && record.is_relevant() {
      record.cosponsor_bioguide_ids = self.cosponsor_ids(record.congress, &slug).await?;
    }
    Ok(record)
  }
}

impl BillFeed for ProPublicaFeed {
  type Error = Error;

  async fn fetch_recent(&self) -> Result<Vec<FeedRecord>> {
    let pages: Vec<RecentPage> = self.get(&self.recent_url()).await?;

    let mut records = Vec::new();
    for page in pages {
      for payload in page.bills {
        records.push(self.finish_record(payload, page.congress).await?);
      }
    }

    tracing::info!(
      count = records.len(),
      congress = self.config.congress,
      "fetched recent bills"
    );
    Ok(records)
  }

  async fn fetch_one<'a>(&'a self, congress: u32, number: &'a str) -> Result<FeedRecord> {
    let slug = feed_slug(number).to_ascii_lowercase();
    let results: Vec<BillPayload> = self.get(&self.bill_url(congress, &slug)).await?;

    let payload = results
      .into_iter()
      .next()
      .ok_or_else(|| Error::NotFound { congress, number: number.to_owned() })?;
    self.finish_record(payload, congress).await
  }
}
