//! Wire shapes of the ProPublica Congress API and their mapping onto
//! [`FeedRecord`].
//!
//! The upstream JSON is loose: congress numbers arrive as strings or
//! integers, and missing dates are `null` or `""`. The deserialisers here
//! accept both.

use billwatch_core::feed::FeedRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// Bill types that describe actual legislation; resolutions are ignored.
pub const RELEVANT_BILL_TYPES: [&str; 4] = ["hr", "s", "hjres", "sjres"];

// ─── Envelope ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
  pub status:  String,
  #[serde(default = "Vec::new")]
  pub results: Vec<T>,
  /// Present on error responses.
  #[serde(default)]
  pub errors:  Vec<ApiError>,
}

#[derive(Debug, Deserialize)]
pub struct ApiError {
  pub error: String,
}

impl<T> Envelope<T> {
  pub fn is_ok(&self) -> bool { self.status.eq_ignore_ascii_case("ok") }

  pub fn error_message(&self) -> String {
    if self.errors.is_empty() {
      format!("status {}", self.status)
    } else {
      self
        .errors
        .iter()
        .map(|e| e.error.as_str())
        .collect::<Vec<_>>()
        .join("; ")
    }
  }
}

// ─── Recent bills ────────────────────────────────────────────────────────────

/// One page of `/{congress}/{chamber}/bills/{type}.json`.
#[derive(Debug, Deserialize)]
pub struct RecentPage {
  #[serde(deserialize_with = "lenient_u32")]
  pub congress: u32,
  #[serde(default)]
  pub bills:    Vec<BillPayload>,
}

// ─── Bill ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BillPayload {
  /// Only set on single-bill responses; list entries inherit it from the page.
  #[serde(deserialize_with = "lenient_opt_u32")]
  pub congress:           Option<u32>,
  pub bill_slug:          Option<String>,
  pub bill_type:          String,
  pub number:             String,
  pub title:              Option<String>,
  pub short_title:        Option<String>,
  pub summary:            Option<String>,
  pub summary_short:      Option<String>,
  pub sponsor_id:         Option<String>,
  pub gpo_pdf_uri:        Option<String>,
  pub congressdotgov_url: Option<String>,
  #[serde(deserialize_with = "lenient_date")]
  pub introduced_date:    Option<NaiveDate>,
  #[serde(deserialize_with = "lenient_date")]
  pub house_passage:      Option<NaiveDate>,
  #[serde(deserialize_with = "lenient_date")]
  pub senate_passage:     Option<NaiveDate>,
  #[serde(deserialize_with = "lenient_date")]
  pub enacted:            Option<NaiveDate>,
  #[serde(deserialize_with = "lenient_date")]
  pub vetoed:             Option<NaiveDate>,
  pub committee_codes:    Vec<String>,
  pub primary_subject:    Option<String>,
  /// Roll calls; only single-bill responses carry these.
  pub votes:              Vec<VotePayload>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VotePayload {
  pub chamber:  String,
  pub question: Option<String>,
  pub result:   Option<String>,
  #[serde(deserialize_with = "lenient_date")]
  pub date:     Option<NaiveDate>,
}

// ─── Cosponsors ──────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CosponsorPage {
  pub cosponsors: Vec<CosponsorPayload>,
}

#[derive(Debug, Deserialize)]
pub struct CosponsorPayload {
  pub cosponsor_id: String,
}

// ─── Mapping ─────────────────────────────────────────────────────────────────

impl BillPayload {
  pub fn is_relevant(&self) -> bool {
    let kind = self.bill_type.to_ascii_lowercase();
    RELEVANT_BILL_TYPES.contains(&kind.as_str())
  }

  /// The lowercase path segment used to address this bill upstream.
  pub fn slug(&self) -> String {
    match &self.bill_slug {
      Some(slug) if !slug.is_empty() => slug.to_ascii_lowercase(),
      _ => billwatch_core::bill::feed_slug(&self.number).to_ascii_lowercase(),
    }
  }

  /// Map onto a [`FeedRecord`]. `page_congress` fills in the congress for
  /// list entries that do not carry their own.
  pub fn into_record(self, page_congress: u32) -> FeedRecord {
    let relevant = self.is_relevant();
    let house_result = chamber_result(self.house_passage, &self.votes, "house");
    let senate_result = chamber_result(self.senate_passage, &self.votes, "senate");

    let title = self
      .title
      .filter(|t| !t.trim().is_empty())
      .or(self.short_title)
      .unwrap_or_default();
    let summary = non_blank(self.summary).or_else(|| non_blank(self.summary_short));
    let full_text_url = non_blank(self.gpo_pdf_uri).or_else(|| non_blank(self.congressdotgov_url));

    FeedRecord {
      congress: self.congress.unwrap_or(page_congress),
      number: self.number,
      title,
      summary,
      full_text_url,
      introduced_on: self.introduced_date,
      house_voted_on: self.house_passage,
      senate_voted_on: self.senate_passage,
      enacted_on: self.enacted,
      vetoed_on: self.vetoed,
      house_result,
      senate_result,
      committee_bioguide_ids: self.committee_codes,
      tag_names: non_blank(self.primary_subject).into_iter().collect(),
      sponsor_bioguide_id: non_blank(self.sponsor_id),
      cosponsor_bioguide_ids: Vec::new(),
      relevant,
    }
  }
}

/// `"passed"` once the chamber's passage date is set; otherwise the result
/// of its latest passage roll call, lowercased.
fn chamber_result(
  passage: Option<NaiveDate>,
  votes:   &[VotePayload],
  chamber: &str,
) -> Option<String> {
  if passage.is_some() {
    return Some("passed".to_owned());
  }
  votes
    .iter()
    .filter(|v| v.chamber.eq_ignore_ascii_case(chamber))
    .filter(|v| {
      v.question
        .as_deref()
        .is_some_and(|q| q.to_ascii_lowercase().contains("passage"))
    })
    .max_by_key(|v| v.date)
    .and_then(|v| v.result.as_deref())
    .map(|r| r.trim().to_ascii_lowercase())
    .filter(|r| !r.is_empty())
}

fn non_blank(s: Option<String>) -> Option<String> {
  s.filter(|s| !s.trim().is_empty())
}

// ─── Lenient deserialisers ───────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrStr {
  Num(u32),
  Str(String),
}

fn parse_num_or_str<E: serde::de::Error>(v: NumOrStr) -> Result<Option<u32>, E> {
  match v {
    NumOrStr::Num(n) => Ok(Some(n)),
    NumOrStr::Str(s) if s.trim().is_empty() => Ok(None),
    NumOrStr::Str(s) => s
      .trim()
      .parse()
      .map(Some)
      .map_err(|_| E::custom(format!("not a congress number: {s:?}"))),
  }
}

fn lenient_u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
  parse_num_or_str(NumOrStr::deserialize(d)?)?
    .ok_or_else(|| serde::de::Error::custom("missing congress number"))
}

fn lenient_opt_u32<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
  match Option::<NumOrStr>::deserialize(d)? {
    Some(v) => parse_num_or_str(v),
    None => Ok(None),
  }
}

fn lenient_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
  match Option::<String>::deserialize(d)? {
    Some(s) if !s.trim().is_empty() => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
      .map(Some)
      .map_err(|e| serde::de::Error::custom(format!("bad date {s:?}: {e}"))),
    _ => Ok(None),
  }
}
