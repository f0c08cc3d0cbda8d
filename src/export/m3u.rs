use std::collections::HashSet;
use std::fmt::Write;

use crate::models::Channel;

pub const M3U_HEADER: &str = "#EXTM3U";

/// Render the M3U playlist: online channels only, first occurrence per URL
pub fn render_m3u(channels: &[Channel], epg_url: Option<&str>, logo_url: Option<&str>) -> String {
    let epg_url = epg_url.filter(|u| !u.is_empty());
    let logo_url = logo_url.filter(|u| !u.is_empty());

    let mut out = String::with_capacity(64 + channels.len() * 96);
    out.push_str(M3U_HEADER);
    out.push('\n');
    if let Some(epg) = epg_url {
        let _ = writeln!(out, "#EXT-X-EPG:URL=\"{epg}\"");
    }
    if let Some(logo) = logo_url {
        let _ = writeln!(out, "#EXT-X-LOGO:URL=\"{logo}\"");
    }

    let mut seen = HashSet::new();
    for channel in channels.iter().filter(|c| c.is_online()) {
        if !seen.insert(channel.url.as_str()) {
            continue;
        }
        let _ = writeln!(
            out,
            "#EXTINF:-1 group-title=\"{}\",{}",
            channel.category, channel.name
        );
        if let Some(logo) = logo_url {
            let _ = writeln!(out, "#EXTVLCOPT:logo=\"{logo}\"");
        }
        out.push_str(&channel.url);
        out.push('\n');
    }
    out
}
