//! Download of the vendor feed.

use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::settings::SourceSettings;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("source answered with HTTP {status}")]
    Status { status: u16 },
}

/// Where the raw feed text comes from.
pub trait FeedSource {
    fn fetch(&self) -> Result<String, FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    url: String,
    timeout: Option<Duration>,
}

impl HttpFeedSource {
    pub fn new(settings: &SourceSettings) -> Self {
        Self {
            url: settings.url.clone(),
            timeout: settings.timeout_secs.map(Duration::from_secs),
        }
    }
}

impl FeedSource for HttpFeedSource {
    fn fetch(&self) -> Result<String, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()?;

        // the query string may carry feed credentials, so only the host is logged
        let host = reqwest::Url::parse(&self.url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_default();
        info!(%host, "downloading source feed");

        let response = client.get(&self.url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes()?;
        info!(bytes = body.len(), "source feed downloaded");
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// Feed text already in memory, e.g. read from a local file.
#[derive(Debug, Clone)]
pub struct StaticFeedSource(pub String);

impl FeedSource for StaticFeedSource {
    fn fetch(&self) -> Result<String, FetchError> {
        Ok(self.0.clone())
    }
}
