/// Configuration default values
///
/// All default values for configuration options, kept in one place.

// Paths
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";
pub const DEFAULT_URLS_PATH: &str = "config/urls.txt";
pub const DEFAULT_TEMPLATES_PATH: &str = "config/templates.txt";
pub const DEFAULT_BLACKLIST_PATH: &str = "config/blacklist.txt";
pub const DEFAULT_WHITELIST_PATH: &str = "config/whitelist.txt";
pub const DEFAULT_OUTPUT_DIR: &str = "outputs";

// Source fetching
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_FETCH_CONCURRENCY: usize = 5;

// Stream probing
pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_PROBE_CONCURRENCY: usize = 4;
pub const DEFAULT_PROBE_MAX_ATTEMPTS: u32 = 3;
/// Megabytes per second
pub const DEFAULT_MIN_DOWNLOAD_SPEED: f64 = 0.01;
pub const DEFAULT_PROBE_SAMPLE_BYTES: usize = 256 * 1024;

// Export file names
pub const DEFAULT_M3U_FILENAME: &str = "all.m3u";
pub const DEFAULT_TXT_FILENAME: &str = "all.txt";
pub const DEFAULT_HISTORY_FILENAME_FORMAT: &str = "history_{timestamp}.csv";
pub const DEFAULT_IPV4_FILENAME: &str = "ipv4.txt";
pub const DEFAULT_IPV6_FILENAME: &str = "ipv6.txt";
pub const DEFAULT_UNCLASSIFIED_FILENAME: &str = "unclassified.txt";
pub const DEFAULT_FAILED_URLS_FILENAME: &str = "failed_urls.txt";

// Name normalization
pub const DEFAULT_NAME_SUFFIXES: &[&str] = &["高清", "HD", "综合"];
