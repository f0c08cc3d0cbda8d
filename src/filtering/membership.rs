use std::path::Path;
use tracing::info;

use crate::errors::{AppError, AppResult};
use crate::models::Channel;

/// Whitelist or blacklist entries
///
/// Entries are opaque: a channel is a member when an entry is a substring of
/// its URL, or equals its URL or its name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MembershipList {
    entries: Vec<String>,
}

impl MembershipList {
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// One entry per line; blank lines and `#` comments are skipped
    pub fn parse(text: &str) -> Self {
        Self::from_entries(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    /// Load a list file. A missing file is an empty list.
    pub fn load<P: AsRef<Path>>(path: P, label: &str) -> AppResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No {} at {}, continuing without one", label, path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
        let list = Self::parse(&text);
        info!("Loaded {} with {} entries from {}", label, list.len(), path.display());
        Ok(list)
    }

    pub fn matches(&self, channel: &Channel) -> bool {
        self.entries.iter().any(|entry| {
            channel.url.contains(entry.as_str()) || channel.url == *entry || channel.name == *entry
        })
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
