//! Error type for `billwatch-feed`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("GET {url} → {status}")]
  Status { url: String, status: reqwest::StatusCode },

  #[error("malformed payload from {url}: {source}")]
  Decode {
    url:    String,
    #[source]
    source: serde_json::Error,
  },

  #[error("upstream error from {url}: {message}")]
  Upstream { url: String, message: String },

  #[error("no bill {number} in congress {congress}")]
  NotFound { congress: u32, number: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
