//! Feed archive download.

use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info};
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::BSE_BHAVCOPY_URL_TEMPLATE;
use crate::errors::{FetchError, Result};

/// Raw archive bytes and where they came from.
#[derive(Debug, Clone)]
pub struct ArchiveBlob {
    pub source: String,
    pub bytes: Vec<u8>,
}

/// Something that can produce a feed archive for a location.
#[async_trait]
pub trait ArchiveFetcher: Send + Sync {
    async fn fetch(&self, location: &str) -> Result<ArchiveBlob>;
}

/// Builds the BSE equity bhavcopy URL for a trade date.
pub fn bhavcopy_url(trade_date: NaiveDate) -> String {
    BSE_BHAVCOPY_URL_TEMPLATE.replace("{}", &trade_date.format("%d%m%y").to_string())
}

/// Downloads archives over HTTP(S).
///
/// The exchange rejects requests without a browser-like user agent, so one is
/// always sent. Any non-2xx status is a failure.
#[derive(Debug)]
pub struct HttpArchiveFetcher {
    client: Client,
}

impl HttpArchiveFetcher {
    /// Fails when the client cannot be configured, e.g. for a user agent
    /// that is not a valid header value.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ArchiveFetcher for HttpArchiveFetcher {
    async fn fetch(&self, location: &str) -> Result<ArchiveBlob> {
        info!("Downloading feed archive from {}", location);
        let response = self
            .client
            .get(location)
            .send()
            .await
            .map_err(FetchError::from)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: location.to_string(),
            }
            .into());
        }

        let bytes = response.bytes().await.map_err(FetchError::from)?;
        debug!("Downloaded {} bytes from {}", bytes.len(), location);
        Ok(ArchiveBlob {
            source: location.to_string(),
            bytes: bytes.to_vec(),
        })
    }
}

/// Reads archives from the local filesystem. `location` is a file path.
#[derive(Debug, Default, Clone)]
pub struct LocalArchiveFetcher {
    base_dir: Option<PathBuf>,
}

impl LocalArchiveFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves relative locations against `base_dir`.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }
}

#[async_trait]
impl ArchiveFetcher for LocalArchiveFetcher {
    async fn fetch(&self, location: &str) -> Result<ArchiveBlob> {
        let path = match &self.base_dir {
            Some(dir) => dir.join(location),
            None => PathBuf::from(location),
        };
        debug!("Reading feed archive from {}", path.display());
        let bytes = tokio::fs::read(&path).await.map_err(FetchError::from)?;
        Ok(ArchiveBlob {
            source: path.display().to_string(),
            bytes,
        })
    }
}
