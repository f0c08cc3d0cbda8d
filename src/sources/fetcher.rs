//! Concurrent download of playlist sources

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::path::Path;
use tracing::{debug, warn};

use crate::config::FetcherConfig;
use crate::errors::{AppError, AppResult, SourceError, SourceResult};
use crate::pipeline::progress::ProgressFn;
use crate::utils::{DecompressionService, UrlUtils};

/// Retrieves the raw text of every source URL
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// One entry per URL, in input order. A source that could not be
    /// retrieved yields an empty string.
    async fn fetch_all(&self, urls: &[String], on_progress: &ProgressFn<'_>) -> Vec<String>;
}

pub struct HttpSourceFetcher {
    client: Client,
    concurrency: usize,
}

impl HttpSourceFetcher {
    pub fn new(config: &FetcherConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("m3u-aggregator/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, config.concurrency))
    }

    pub fn with_client(client: Client, concurrency: usize) -> Self {
        Self {
            client,
            concurrency: concurrency.max(1),
        }
    }

    async fn fetch_one(&self, url: &str) -> SourceResult<String> {
        debug!("Fetching source: {}", UrlUtils::obfuscate_credentials(url));

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| transport_error(url, e))?;
        debug!("Fetched {} bytes of raw content", bytes.len());

        let decompressed = DecompressionService::decompress(bytes)?;
        Ok(String::from_utf8_lossy(&decompressed).into_owned())
    }
}

fn transport_error(url: &str, error: reqwest::Error) -> SourceError {
    if error.is_timeout() {
        return SourceError::Timeout {
            url: UrlUtils::obfuscate_credentials(url),
        };
    }
    SourceError::Http {
        status: error.status().map(|s| s.as_u16()).unwrap_or(0),
        message: UrlUtils::obfuscate_credentials(&error.to_string()),
    }
}

#[async_trait]
impl SourceFetcher for HttpSourceFetcher {
    async fn fetch_all(&self, urls: &[String], on_progress: &ProgressFn<'_>) -> Vec<String> {
        stream::iter(urls.iter().cloned())
            .map(|url| async move {
                let content = match self.fetch_one(&url).await {
                    Ok(content) => content,
                    Err(e) => {
                        warn!(
                            "Failed to fetch source {}: {}",
                            UrlUtils::obfuscate_credentials(&url),
                            e
                        );
                        String::new()
                    }
                };
                on_progress(1);
                content
            })
            .buffered(self.concurrency)
            .collect()
            .await
    }
}

/// Read the source list: one URL per line, blank lines and `#` comments skipped
pub fn load_source_urls<P: AsRef<Path>>(path: P) -> AppResult<Vec<String>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(AppError::missing_input("source list", path));
    }
    let text = std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
    Ok(parse_source_urls(&text))
}

pub fn parse_source_urls(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
