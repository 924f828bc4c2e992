//! Raw image byte retrieval from local paths and HTTP(S) URLs.
//!
//! Sources are classified by prefix: anything starting with `http://` or
//! `https://` is fetched over HTTP, everything else is read from disk.
//! Decoding is left to the caller.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::future::try_join_all;
use reqwest::Client;
use tracing::debug;
use url::Url;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur while fetching image bytes.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { url: Url, status: u16 },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("timed out after {0:?} fetching {1}")]
    Timeout(Duration, String),

    #[error("empty payload from {0}")]
    Empty(String),
}

/// Where the bytes of one image come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Local(PathBuf),
    Remote(Url),
}

impl SourceLocation {
    /// Classify a path or URL string.
    pub fn parse(input: &str) -> Result<Self, SourceError> {
        let trimmed = input.trim();
        if is_remote(trimmed) {
            Ok(SourceLocation::Remote(Url::parse(trimmed)?))
        } else {
            Ok(SourceLocation::Local(PathBuf::from(trimmed)))
        }
    }
}

impl std::fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceLocation::Local(path) => write!(f, "{}", path.display()),
            SourceLocation::Remote(url) => write!(f, "{url}"),
        }
    }
}

fn is_remote(input: &str) -> bool {
    let lower = input.get(..8).unwrap_or(input).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Fetches image bytes with a shared HTTP client.
#[derive(Debug, Clone)]
pub struct Fetcher {
    http: Client,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(timeout: Duration) -> Result<Self, SourceError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetch the bytes behind a path or URL.
    pub async fn fetch(&self, input: &str) -> Result<Vec<u8>, SourceError> {
        let location = SourceLocation::parse(input)?;
        self.fetch_location(&location).await
    }

    /// Fetch every input concurrently. Results keep the input order and the
    /// first failure aborts the batch.
    pub async fn fetch_all<S: AsRef<str>>(&self, inputs: &[S]) -> Result<Vec<Vec<u8>>, SourceError> {
        try_join_all(inputs.iter().map(|input| self.fetch(input.as_ref()))).await
    }

    pub async fn fetch_location(&self, location: &SourceLocation) -> Result<Vec<u8>, SourceError> {
        let fetch = async {
            match location {
                SourceLocation::Remote(url) => self.fetch_remote(url).await,
                SourceLocation::Local(path) => read_local(path).await,
            }
        };
        let bytes = tokio::time::timeout(self.timeout, fetch)
            .await
            .map_err(|_| SourceError::Timeout(self.timeout, location.to_string()))??;

        if bytes.is_empty() {
            return Err(SourceError::Empty(location.to_string()));
        }
        debug!(source = %location, bytes = bytes.len(), "Fetched image");
        Ok(bytes)
    }

    async fn fetch_remote(&self, url: &Url) -> Result<Vec<u8>, SourceError> {
        let resp = self.http.get(url.clone()).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.clone(),
                status: status.as_u16(),
            });
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

async fn read_local(path: &Path) -> Result<Vec<u8>, SourceError> {
    tokio::fs::read(path).await.map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })
}
