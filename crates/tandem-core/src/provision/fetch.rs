//! Network retrieval of archive bundles.

use std::time::Duration;

use futures::future::BoxFuture;

use crate::error::{Error, Result};

/// Source of remote archive bytes.
///
/// The fetch is the only suspension point of a pipeline run.
pub trait ArchiveFetcher: Send + Sync {
    /// Download `url` and return the raw body.
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>>>;
}

/// HTTP GET fetcher backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tandem/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

impl ArchiveFetcher for HttpFetcher {
    fn fetch<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Vec<u8>>> {
        Box::pin(async move {
            tracing::info!("Downloading {}", url);

            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| fetch_error(url, e))?;

            if !response.status().is_success() {
                return Err(Error::Fetch {
                    url: url.to_string(),
                    message: format!("HTTP {}", response.status()),
                });
            }

            let bytes = response.bytes().await.map_err(|e| fetch_error(url, e))?;
            tracing::info!("Downloaded {} bytes from {}", bytes.len(), url);
            Ok(bytes.to_vec())
        })
    }
}

fn fetch_error(url: &str, err: reqwest::Error) -> Error {
    let message = if err.is_timeout() {
        "request timed out".to_string()
    } else {
        err.to_string()
    };
    Error::Fetch {
        url: url.to_string(),
        message,
    }
}
