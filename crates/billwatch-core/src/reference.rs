//! Reference entities the sync engine resolves while enriching a bill.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A numbered session of Congress, e.g. the 118th.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Congress {
  pub congress_id: Uuid,
  pub number:      u32,
}

/// A congressional committee, keyed by its upstream code (e.g. `"HSJU"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Committee {
  pub committee_id: Uuid,
  pub bioguide_id:  String,
  pub name:         Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewCommittee {
  pub bioguide_id: String,
  pub name:        Option<String>,
}

/// A free-form subject label attached to bills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
  pub tag_id: Uuid,
  pub name:   String,
}

/// A member of Congress, keyed by bioguide id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
  pub member_id:   Uuid,
  pub bioguide_id: String,
  pub name:        Option<String>,
  /// Party code as published upstream, e.g. `"D"`, `"R"`, `"I"`.
  pub party:       Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewMember {
  pub bioguide_id: String,
  pub name:        Option<String>,
  pub party:       Option<String>,
}

impl NewMember {
  pub fn new(bioguide_id: impl Into<String>) -> Self {
    Self { bioguide_id: bioguide_id.into(), name: None, party: None }
  }
}

// ─── Sponsorship ─────────────────────────────────────────────────────────────

/// A bill has at most one primary sponsorship; every other sponsorship is a
/// cosponsorship.
#[derive(
  Debug,
  Clone,
  Copy,
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
pub enum SponsorshipType {
  Primary,
  Cosponsor,
}

impl SponsorshipType {
  pub fn parse(s: &str) -> Result<Self> {
    s.parse().map_err(|_| Error::UnknownSponsorshipType(s.to_owned()))
  }

  pub fn as_str(self) -> &'static str { self.into() }
}
