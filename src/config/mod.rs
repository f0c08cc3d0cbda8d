use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::errors::{AppError, AppResult};

pub mod defaults;
pub mod duration_serde;

use defaults::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub tester: TesterConfig,
    #[serde(default)]
    pub exporter: ExporterConfig,
    #[serde(default)]
    pub url_filter: UrlFilterConfig,
    #[serde(default)]
    pub normalizer: NormalizerConfig,
}

/// Input files and the output directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Source list, one playlist URL per line
    #[serde(default = "default_urls_path")]
    pub urls: PathBuf,
    /// Category template
    #[serde(default = "default_templates_path")]
    pub templates: PathBuf,
    #[serde(default = "default_blacklist_path")]
    pub blacklist: PathBuf,
    #[serde(default = "default_whitelist_path")]
    pub whitelist: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    #[serde(default = "default_fetch_timeout", with = "duration_serde::duration")]
    pub timeout: Duration,
    #[serde(default = "default_fetch_concurrency")]
    pub concurrency: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TesterConfig {
    /// Upper bound for a single probe attempt, headers and body sample included
    #[serde(default = "default_probe_timeout", with = "duration_serde::duration")]
    pub timeout: Duration,
    #[serde(default = "default_probe_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_probe_max_attempts")]
    pub max_attempts: u32,
    /// Minimum accepted throughput in MB/s
    #[serde(default = "default_min_download_speed")]
    pub min_download_speed: f64,
    /// Bytes read from the stream body before throughput is measured
    #[serde(default = "default_probe_sample_bytes")]
    pub sample_bytes: usize,
    /// Log every probe attempt at info instead of debug
    #[serde(default)]
    pub log_attempts: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExporterConfig {
    #[serde(default = "default_m3u_filename")]
    pub m3u_filename: String,
    #[serde(default = "default_txt_filename")]
    pub txt_filename: String,
    #[serde(default)]
    pub enable_history: bool,
    /// `{timestamp}` is replaced with the run time as `%Y%m%d_%H%M%S`
    #[serde(default = "default_history_filename_format")]
    pub history_filename_format: String,
    #[serde(default)]
    pub m3u_epg_url: Option<String>,
    #[serde(default)]
    pub m3u_logo_url: Option<String>,
    #[serde(default = "default_ipv4_filename")]
    pub ipv4_filename: String,
    #[serde(default = "default_ipv6_filename")]
    pub ipv6_filename: String,
    /// Restrict the IPv4/IPv6 split files to online channels
    #[serde(default)]
    pub ip_split_online_only: bool,
    #[serde(default = "default_unclassified_filename")]
    pub unclassified_filename: String,
    #[serde(default = "default_failed_urls_filename")]
    pub failed_urls_filename: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UrlFilterConfig {
    /// Query parameters stripped from every parsed stream URL
    #[serde(default)]
    pub remove_params: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Tokens removed anywhere in a channel name before alias lookup
    #[serde(default = "default_name_suffixes")]
    pub suffixes: Vec<String>,
}

// Path defaults
fn default_urls_path() -> PathBuf {
    PathBuf::from(DEFAULT_URLS_PATH)
}

fn default_templates_path() -> PathBuf {
    PathBuf::from(DEFAULT_TEMPLATES_PATH)
}

fn default_blacklist_path() -> PathBuf {
    PathBuf::from(DEFAULT_BLACKLIST_PATH)
}

fn default_whitelist_path() -> PathBuf {
    PathBuf::from(DEFAULT_WHITELIST_PATH)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_DIR)
}

// Fetcher defaults
fn default_fetch_timeout() -> Duration {
    Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS)
}

fn default_fetch_concurrency() -> usize {
    DEFAULT_FETCH_CONCURRENCY
}

// Tester defaults
fn default_probe_timeout() -> Duration {
    Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS)
}

fn default_probe_concurrency() -> usize {
    DEFAULT_PROBE_CONCURRENCY
}

fn default_probe_max_attempts() -> u32 {
    DEFAULT_PROBE_MAX_ATTEMPTS
}

fn default_min_download_speed() -> f64 {
    DEFAULT_MIN_DOWNLOAD_SPEED
}

fn default_probe_sample_bytes() -> usize {
    DEFAULT_PROBE_SAMPLE_BYTES
}

// Exporter defaults
fn default_m3u_filename() -> String {
    DEFAULT_M3U_FILENAME.to_string()
}

fn default_txt_filename() -> String {
    DEFAULT_TXT_FILENAME.to_string()
}

fn default_history_filename_format() -> String {
    DEFAULT_HISTORY_FILENAME_FORMAT.to_string()
}

fn default_ipv4_filename() -> String {
    DEFAULT_IPV4_FILENAME.to_string()
}

fn default_ipv6_filename() -> String {
    DEFAULT_IPV6_FILENAME.to_string()
}

fn default_unclassified_filename() -> String {
    DEFAULT_UNCLASSIFIED_FILENAME.to_string()
}

fn default_failed_urls_filename() -> String {
    DEFAULT_FAILED_URLS_FILENAME.to_string()
}

fn default_name_suffixes() -> Vec<String> {
    DEFAULT_NAME_SUFFIXES.iter().map(|s| s.to_string()).collect()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            urls: default_urls_path(),
            templates: default_templates_path(),
            blacklist: default_blacklist_path(),
            whitelist: default_whitelist_path(),
            output_dir: default_output_dir(),
        }
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            timeout: default_fetch_timeout(),
            concurrency: default_fetch_concurrency(),
        }
    }
}

impl Default for TesterConfig {
    fn default() -> Self {
        Self {
            timeout: default_probe_timeout(),
            concurrency: default_probe_concurrency(),
            max_attempts: default_probe_max_attempts(),
            min_download_speed: default_min_download_speed(),
            sample_bytes: default_probe_sample_bytes(),
            log_attempts: false,
        }
    }
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            m3u_filename: default_m3u_filename(),
            txt_filename: default_txt_filename(),
            enable_history: false,
            history_filename_format: default_history_filename_format(),
            m3u_epg_url: None,
            m3u_logo_url: None,
            ipv4_filename: default_ipv4_filename(),
            ipv6_filename: default_ipv6_filename(),
            ip_split_online_only: false,
            unclassified_filename: default_unclassified_filename(),
            failed_urls_filename: default_failed_urls_filename(),
        }
    }
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            suffixes: default_name_suffixes(),
        }
    }
}

impl Config {
    /// Load and validate the configuration file.
    ///
    /// A missing file is fatal: the run needs to know where its sources and
    /// template live before anything else happens.
    pub fn load_from_file<P: AsRef<Path>>(config_file: P) -> AppResult<Self> {
        let path = config_file.as_ref();
        if !path.exists() {
            return Err(AppError::missing_input("configuration file", path));
        }

        let contents = std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
        let config = Self::from_toml_str(&contents)?;
        info!("Configuration loaded from: {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| AppError::configuration(format!("invalid TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.fetcher.concurrency == 0 {
            return Err(AppError::configuration("fetcher.concurrency must be at least 1"));
        }
        if self.tester.concurrency == 0 {
            return Err(AppError::configuration("tester.concurrency must be at least 1"));
        }
        if self.tester.max_attempts == 0 {
            return Err(AppError::configuration("tester.max_attempts must be at least 1"));
        }
        let speed = self.tester.min_download_speed;
        if speed.is_nan() || speed < 0.0 {
            return Err(AppError::configuration(
                "tester.min_download_speed must be a non-negative number",
            ));
        }
        if self.tester.sample_bytes == 0 {
            return Err(AppError::configuration("tester.sample_bytes must be at least 1"));
        }
        if self.normalizer.suffixes.iter().any(|s| s.is_empty()) {
            return Err(AppError::configuration("normalizer.suffixes must not contain empty strings"));
        }
        Ok(())
    }
}
