//! Playlist and segment retrieval.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use url::Url;

use hc_core::config::FetchConfig;
use hc_core::{Error, Result};

/// Retrieval seam for playlist text and segment bytes.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a playlist as text.
    async fn fetch_text(&self, url: &Url) -> Result<String>;

    /// Fetch a segment into `dest`, returning the number of bytes written.
    async fn fetch_to_file(&self, url: &Url, dest: &Path) -> Result<u64>;
}

/// [`Fetcher`] for `http(s)://` locators (via reqwest) and `file://`
/// locators (read from disk).
///
/// Each HTTP request is bounded by the configured timeout. Transport errors
/// and 5xx responses are retried up to `retries` times with doubling
/// backoff; other non-success responses fail immediately.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
    retries: u32,
    backoff: Duration,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Self {
        let timeout = config.timeout();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client with timeout: {}", e);
                Client::new()
            });

        Self {
            client,
            timeout,
            retries: config.retries,
            backoff: config.retry_backoff(),
        }
    }

    fn transport_error(&self, url: &Url, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(format!("GET {url}"), self.timeout)
        } else {
            Error::fetch(url, e.to_string())
        }
    }

    /// Send a GET, retrying transient failures.
    async fn get(&self, url: &Url) -> Result<reqwest::Response> {
        let mut attempt = 0u32;
        loop {
            let failure = match self.client.get(url.clone()).send().await {
                Ok(resp) if resp.status().is_success() => return Ok(resp),
                Ok(resp) if resp.status().is_server_error() => {
                    Error::fetch(url, format!("HTTP {}", resp.status()))
                }
                Ok(resp) => return Err(Error::fetch(url, format!("HTTP {}", resp.status()))),
                Err(e) => self.transport_error(url, e),
            };

            if attempt >= self.retries {
                return Err(failure);
            }
            let delay = self.backoff * 2u32.saturating_pow(attempt);
            attempt += 1;
            tracing::warn!(
                "GET {url} failed ({failure}); retry {attempt}/{} in {delay:?}",
                self.retries
            );
            tokio::time::sleep(delay).await;
        }
    }
}

fn local_path(url: &Url) -> Result<std::path::PathBuf> {
    url.to_file_path()
        .map_err(|()| Error::invalid_locator(url.as_str(), "not a local file path"))
}

fn read_error(url: &Url, e: std::io::Error) -> Error {
    Error::fetch(url, e.to_string())
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, url: &Url) -> Result<String> {
        tracing::debug!("fetching playlist {url}");
        match url.scheme() {
            "file" => tokio::fs::read_to_string(local_path(url)?)
                .await
                .map_err(|e| read_error(url, e)),
            "http" | "https" => {
                let resp = self.get(url).await?;
                resp.text().await.map_err(|e| self.transport_error(url, e))
            }
            other => Err(Error::invalid_locator(
                url.as_str(),
                format!("unsupported scheme '{other}'"),
            )),
        }
    }

    async fn fetch_to_file(&self, url: &Url, dest: &Path) -> Result<u64> {
        tracing::debug!("downloading segment {url} to {}", dest.display());
        match url.scheme() {
            "file" => tokio::fs::copy(local_path(url)?, dest)
                .await
                .map_err(|e| read_error(url, e)),
            "http" | "https" => {
                let mut resp = self.get(url).await?;
                let mut file = tokio::fs::File::create(dest).await?;
                let mut written = 0u64;
                while let Some(chunk) = resp
                    .chunk()
                    .await
                    .map_err(|e| self.transport_error(url, e))?
                {
                    file.write_all(&chunk).await?;
                    written += chunk.len() as u64;
                }
                file.flush().await?;
                Ok(written)
            }
            other => Err(Error::invalid_locator(
                url.as_str(),
                format!("unsupported scheme '{other}'"),
            )),
        }
    }
}
