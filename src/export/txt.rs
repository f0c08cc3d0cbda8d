//! Grouped `Name,URL` listings
//!
//! ```text
//! 央视频道,#genre#
//! CCTV-1,http://...
//!
//! 卫视频道,#genre#
//! 湖南卫视,http://...
//! ```

use std::collections::HashSet;
use std::fmt::Write;

use crate::models::Channel;
use crate::utils::{AddressFamily, UrlUtils};

pub const GENRE_SUFFIX: &str = ",#genre#";

/// Write a category header whenever the category changes, with a blank line
/// between groups
pub fn render_grouped<'a, I>(channels: I) -> String
where
    I: IntoIterator<Item = &'a Channel>,
{
    let mut out = String::new();
    let mut current: Option<&str> = None;
    for channel in channels {
        if current != Some(channel.category.as_str()) {
            if current.is_some() {
                out.push('\n');
            }
            let _ = writeln!(out, "{}{}", channel.category, GENRE_SUFFIX);
            current = Some(channel.category.as_str());
        }
        let _ = writeln!(out, "{},{}", channel.name, channel.url);
    }
    out
}

/// Plain listing: online channels only, first occurrence per URL
pub fn render_txt(channels: &[Channel]) -> String {
    let mut seen = HashSet::new();
    render_grouped(
        channels
            .iter()
            .filter(|c| c.is_online())
            .filter(|c| seen.insert(c.url.as_str())),
    )
}

/// Split channels by the address family of their URL host. Channels with a
/// domain host, or a URL that does not parse, land in neither list.
pub fn partition_by_family(
    channels: &[Channel],
    online_only: bool,
) -> (Vec<&Channel>, Vec<&Channel>) {
    let mut ipv4 = Vec::new();
    let mut ipv6 = Vec::new();
    for channel in channels {
        if online_only && !channel.is_online() {
            continue;
        }
        match UrlUtils::host_family(&channel.url) {
            Some(AddressFamily::Ipv4) => ipv4.push(channel),
            Some(AddressFamily::Ipv6) => ipv6.push(channel),
            Some(AddressFamily::Domain) | None => {}
        }
    }
    (ipv4, ipv6)
}
