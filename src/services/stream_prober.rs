//! Liveness and throughput probing of stream URLs
//!
//! Every channel gets up to `max_attempts` tries. An attempt downloads a
//! sample of the stream body and measures both the time to response headers
//! and the throughput of the sample. The first attempt that meets the speed
//! floor marks the channel online; otherwise it ends offline and its URL is
//! recorded in [`FailedUrls`].

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use std::collections::BTreeSet;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::config::TesterConfig;
use crate::errors::AppResult;
use crate::models::Channel;
use crate::pipeline::progress::ProgressFn;
use crate::utils::UrlUtils;

const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

/// Sets `status` and `response_time` on every channel
#[async_trait]
pub trait StreamProber: Send + Sync {
    /// Returns the channels in input order. URLs of channels that end up
    /// offline are added to `failed_urls`.
    async fn probe(
        &self,
        channels: Vec<Channel>,
        on_progress: &ProgressFn<'_>,
        failed_urls: &FailedUrls,
    ) -> Vec<Channel>;
}

/// URLs that failed every probe attempt, shared by concurrent probe tasks
#[derive(Debug, Default)]
pub struct FailedUrls {
    urls: Mutex<BTreeSet<String>>,
}

impl FailedUrls {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeSet<String>> {
        match self.urls.lock() {
            Ok(urls) => urls,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn insert(&self, url: impl Into<String>) -> bool {
        self.lock().insert(url.into())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.lock().contains(url)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Sorted copy of the recorded URLs
    pub fn to_sorted_vec(&self) -> Vec<String> {
        self.lock().iter().cloned().collect()
    }
}

/// Why a single attempt did not count as a success
#[derive(Debug, Error)]
pub enum ProbeFailure {
    #[error("timed out")]
    Timeout,
    #[error("HTTP status {0}")]
    Status(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error("too slow: {speed:.3} MB/s")]
    TooSlow { speed: f64 },
}

/// Result of one successful download sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeMeasurement {
    /// Time until response headers arrived
    pub response_time: Duration,
    pub bytes: usize,
    /// Time until the sample was complete
    pub elapsed: Duration,
}

impl ProbeMeasurement {
    /// Sample throughput in MB/s
    pub fn speed_mbps(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if self.bytes == 0 {
            return 0.0;
        }
        if secs <= 0.0 {
            return f64::INFINITY;
        }
        self.bytes as f64 / secs / BYTES_PER_MEGABYTE
    }
}

pub struct HttpSpeedTester {
    client: Client,
    config: TesterConfig,
}

impl HttpSpeedTester {
    pub fn new(config: TesterConfig) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(config.timeout)
            .user_agent(concat!("m3u-aggregator/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: TesterConfig) -> Self {
        Self { client, config }
    }

    /// One bounded download attempt
    pub async fn attempt(&self, url: &str) -> Result<ProbeMeasurement, ProbeFailure> {
        let started = Instant::now();
        let sample = async {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| ProbeFailure::Network(UrlUtils::obfuscate_credentials(&e.to_string())))?;
            let response_time = started.elapsed();

            let status = response.status();
            if !status.is_success() {
                return Err(ProbeFailure::Status(status.as_u16()));
            }

            let mut body = response.bytes_stream();
            let mut bytes = 0usize;
            while bytes < self.config.sample_bytes {
                match body.next().await {
                    Some(Ok(chunk)) => bytes += chunk.len(),
                    Some(Err(e)) => return Err(ProbeFailure::Network(e.to_string())),
                    None => break,
                }
            }

            Ok::<_, ProbeFailure>(ProbeMeasurement {
                response_time,
                bytes,
                elapsed: started.elapsed(),
            })
        };

        let measurement = timeout(self.config.timeout, sample)
            .await
            .map_err(|_| ProbeFailure::Timeout)??;

        let speed = measurement.speed_mbps();
        if speed < self.config.min_download_speed {
            return Err(ProbeFailure::TooSlow { speed });
        }
        Ok(measurement)
    }

    async fn probe_channel(&self, mut channel: Channel, failed_urls: &FailedUrls) -> Channel {
        let max_attempts = self.config.max_attempts.max(1);
        for attempt in 1..=max_attempts {
            match self.attempt(&channel.url).await {
                Ok(measurement) => {
                    self.log_attempt(
                        &channel,
                        attempt,
                        &format!(
                            "online in {:.2}s at {:.3} MB/s",
                            measurement.response_time.as_secs_f64(),
                            measurement.speed_mbps()
                        ),
                    );
                    channel.mark_online(measurement.response_time);
                    return channel;
                }
                Err(failure) => self.log_attempt(&channel, attempt, &failure.to_string()),
            }
        }

        channel.mark_offline();
        failed_urls.insert(channel.url.clone());
        channel
    }

    fn log_attempt(&self, channel: &Channel, attempt: u32, outcome: &str) {
        let url = UrlUtils::obfuscate_credentials(&channel.url);
        if self.config.log_attempts {
            info!(
                "Probe {}/{} for {} ({}): {}",
                attempt, self.config.max_attempts, channel.name, url, outcome
            );
        } else {
            debug!(
                "Probe {}/{} for {} ({}): {}",
                attempt, self.config.max_attempts, channel.name, url, outcome
            );
        }
    }
}

#[async_trait]
impl StreamProber for HttpSpeedTester {
    async fn probe(
        &self,
        channels: Vec<Channel>,
        on_progress: &ProgressFn<'_>,
        failed_urls: &FailedUrls,
    ) -> Vec<Channel> {
        let mut probed: Vec<(usize, Channel)> = stream::iter(channels.into_iter().enumerate())
            .map(|(idx, channel)| async move {
                let channel = self.probe_channel(channel, failed_urls).await;
                on_progress(1);
                (idx, channel)
            })
            .buffer_unordered(self.config.concurrency.max(1))
            .collect()
            .await;

        probed.sort_by_key(|(idx, _)| *idx);
        probed.into_iter().map(|(_, channel)| channel).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_urls_are_sorted_and_unique() {
        let failed = FailedUrls::new();
        assert!(failed.insert("http://b.example.com/live"));
        assert!(failed.insert("http://a.example.com/live"));
        assert!(!failed.insert("http://b.example.com/live"));
        assert_eq!(failed.len(), 2);
        assert!(failed.contains("http://a.example.com/live"));
        assert_eq!(
            failed.to_sorted_vec(),
            vec!["http://a.example.com/live", "http://b.example.com/live"]
        );
    }

    #[test]
    fn speed_is_megabytes_per_second() {
        let measurement = ProbeMeasurement {
            response_time: Duration::from_millis(100),
            bytes: 2 * 1024 * 1024,
            elapsed: Duration::from_secs(2),
        };
        assert!((measurement.speed_mbps() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_sample_has_zero_speed() {
        let measurement = ProbeMeasurement {
            response_time: Duration::ZERO,
            bytes: 0,
            elapsed: Duration::ZERO,
        };
        assert_eq!(measurement.speed_mbps(), 0.0);
    }

    #[tokio::test]
    async fn unreachable_stream_goes_offline() {
        let config = TesterConfig {
            timeout: Duration::from_millis(500),
            max_attempts: 2,
            ..TesterConfig::default()
        };
        let tester = HttpSpeedTester::new(config).unwrap();
        let failed = FailedUrls::new();
        let channels = vec![Channel::new("Dead", "http://127.0.0.1:1/live.m3u8", "News")];

        let probed = tester.probe(channels, &|_: usize| {}, &failed).await;
        assert_eq!(probed[0].status, crate::models::ProbeStatus::Offline);
        assert!(probed[0].response_time.is_none());
        assert!(failed.contains("http://127.0.0.1:1/live.m3u8"));
    }
}
