//! Channel filters applied between classification and probing
//!
//! Each filter consumes the channel vector and returns the survivors in their
//! original relative order.

pub mod membership;

pub use membership::MembershipList;

use std::collections::HashSet;
use tracing::debug;

use crate::classification::Classifier;
use crate::models::Channel;

/// Keep channels whose normalized name matches at least one template pattern
pub fn retain_in_template(channels: Vec<Channel>, classifier: &Classifier<'_>) -> Vec<Channel> {
    let before = channels.len();
    let kept: Vec<Channel> = channels
        .into_iter()
        .filter(|c| classifier.is_in_template(&c.name))
        .collect();
    debug!("Template filter kept {} of {} channels", kept.len(), before);
    kept
}

/// Drop channels matching the blacklist
pub fn remove_blacklisted(channels: Vec<Channel>, blacklist: &MembershipList) -> Vec<Channel> {
    if blacklist.is_empty() {
        return channels;
    }
    let before = channels.len();
    let kept: Vec<Channel> = channels.into_iter().filter(|c| !blacklist.matches(c)).collect();
    debug!("Blacklist removed {} channels", before - kept.len());
    kept
}

/// Keep the first channel for every URL
pub fn dedupe_by_url(channels: Vec<Channel>) -> Vec<Channel> {
    let mut seen = HashSet::with_capacity(channels.len());
    channels
        .into_iter()
        .filter(|c| seen.insert(c.url.clone()))
        .collect()
}

/// Distinct names of unclassified channels, in first-seen order
pub fn unclassified_names(channels: &[Channel]) -> Vec<String> {
    let mut seen = HashSet::new();
    channels
        .iter()
        .filter(|c| c.is_unclassified())
        .filter(|c| seen.insert(c.name.as_str()))
        .map(|c| c.name.clone())
        .collect()
}
