//! Channel records as they move through the pipeline
//!
//! The parser produces [`ParsedChannel`]s (name and URL only). The classify
//! stage turns each into a [`Channel`] carrying a category, and the probe
//! stage fills in liveness. Nothing is mutated once export starts.

use std::fmt;
use std::time::Duration;

/// Category assigned to channels that match no template pattern
pub const UNCLASSIFIED_CATEGORY: &str = "Other";

/// A candidate record straight out of a playlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedChannel {
    pub name: String,
    pub url: String,
}

impl ParsedChannel {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Liveness as decided by the probe stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ProbeStatus {
    #[default]
    Unknown,
    Online,
    Offline,
}

impl ProbeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProbeStatus::Unknown => "unknown",
            ProbeStatus::Online => "online",
            ProbeStatus::Offline => "offline",
        }
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified playlist entry
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    /// Canonical name after normalization
    pub name: String,
    pub url: String,
    pub category: String,
    pub status: ProbeStatus,
    /// Only set while `status` is `Online`
    pub response_time: Option<Duration>,
}

impl Channel {
    pub fn new(name: impl Into<String>, url: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            category: category.into(),
            status: ProbeStatus::Unknown,
            response_time: None,
        }
    }

    pub fn is_online(&self) -> bool {
        self.status == ProbeStatus::Online
    }

    pub fn is_unclassified(&self) -> bool {
        self.category == UNCLASSIFIED_CATEGORY
    }

    pub fn mark_online(&mut self, response_time: Duration) {
        self.status = ProbeStatus::Online;
        self.response_time = Some(response_time);
    }

    pub fn mark_offline(&mut self) {
        self.status = ProbeStatus::Offline;
        self.response_time = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_channels_are_unprobed() {
        let channel = Channel::new("CCTV-1", "http://example.com/1.m3u8", "News");
        assert_eq!(channel.status, ProbeStatus::Unknown);
        assert!(channel.response_time.is_none());
        assert!(!channel.is_online());
    }

    #[test]
    fn marking_offline_clears_response_time() {
        let mut channel = Channel::new("CCTV-1", "http://example.com/1.m3u8", "News");
        channel.mark_online(Duration::from_millis(120));
        assert!(channel.is_online());
        assert_eq!(channel.response_time, Some(Duration::from_millis(120)));

        channel.mark_offline();
        assert_eq!(channel.status, ProbeStatus::Offline);
        assert!(channel.response_time.is_none());
    }

    #[test]
    fn status_display_is_lowercase() {
        assert_eq!(ProbeStatus::Online.to_string(), "online");
        assert_eq!(ProbeStatus::Offline.to_string(), "offline");
        assert_eq!(ProbeStatus::Unknown.to_string(), "unknown");
    }
}
