//! Line-record parser for playlist sources
//!
//! Two source shapes are understood:
//!
//! - **TXT lists**: `Name,http://...` per line, usually interleaved with
//!   `Category,#genre#` headers which are ignored here
//! - **M3U playlists**: `#EXTINF:...,Name` followed by the stream URL line
//!
//! A source is treated as a TXT list as soon as one of its lines has the
//! `Name,http...` shape; otherwise it is read as M3U. Records are produced
//! lazily, one per line (TXT) or line pair (M3U). Lines that fit neither shape
//! are skipped, so a malformed source simply yields fewer records.

use std::str::Lines;
use tracing::debug;

use crate::models::ParsedChannel;
use crate::utils::UrlUtils;

const EXTINF_PREFIX: &str = "#EXTINF";

/// Detected shape of a playlist source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistFormat {
    Txt,
    M3u,
}

impl PlaylistFormat {
    pub fn detect(content: &str) -> Self {
        if content.lines().any(|line| split_txt_line(line).is_some()) {
            PlaylistFormat::Txt
        } else {
            PlaylistFormat::M3u
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlaylistParser {
    remove_params: Vec<String>,
}

impl PlaylistParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parser that strips the given query parameters from every stream URL
    pub fn with_removed_params(remove_params: Vec<String>) -> Self {
        Self { remove_params }
    }

    /// Lazily parse one source's content into channel records
    pub fn parse<'a>(&'a self, content: &'a str) -> ParsedRecords<'a> {
        let format = PlaylistFormat::detect(content);
        debug!("Parsing source as {:?} ({} bytes)", format, content.len());
        ParsedRecords {
            lines: content.lines(),
            format,
            pending_name: None,
            remove_params: &self.remove_params,
        }
    }
}

/// Iterator over the records of one source
pub struct ParsedRecords<'a> {
    lines: Lines<'a>,
    format: PlaylistFormat,
    /// Name from the last `#EXTINF` line still waiting for its URL line
    pending_name: Option<String>,
    remove_params: &'a [String],
}

impl ParsedRecords<'_> {
    pub fn format(&self) -> PlaylistFormat {
        self.format
    }

    fn record(&self, raw_name: &str, raw_url: &str) -> Option<ParsedChannel> {
        let name = clean_name(raw_name);
        let url = UrlUtils::clean_stream_url(raw_url, self.remove_params);
        if name.is_empty() || url.is_empty() {
            debug!("Skipping record with empty name or URL: {:?} -> {:?}", raw_name, raw_url);
            return None;
        }
        Some(ParsedChannel::new(name, url))
    }

    fn next_txt(&mut self) -> Option<ParsedChannel> {
        loop {
            let line = self.lines.next()?;
            if let Some((name, url)) = split_txt_line(line)
                && let Some(record) = self.record(name, url)
            {
                return Some(record);
            }
        }
    }

    fn next_m3u(&mut self) -> Option<ParsedChannel> {
        loop {
            let line = self.lines.next()?.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(rest) = line.strip_prefix(EXTINF_PREFIX) {
                if self.pending_name.is_some() {
                    debug!("#EXTINF without stream URL, dropping previous entry");
                }
                self.pending_name = Some(extinf_title(rest).to_string());
                continue;
            }

            // Other directives (#EXTVLCOPT, #EXTGRP, ...) sit between EXTINF and URL
            if line.starts_with('#') {
                continue;
            }

            match self.pending_name.take() {
                Some(name) => {
                    if let Some(record) = self.record(&name, line) {
                        return Some(record);
                    }
                }
                None => debug!("Stream URL without #EXTINF metadata skipped"),
            }
        }
    }
}

impl Iterator for ParsedRecords<'_> {
    type Item = ParsedChannel;

    fn next(&mut self) -> Option<Self::Item> {
        match self.format {
            PlaylistFormat::Txt => self.next_txt(),
            PlaylistFormat::M3u => self.next_m3u(),
        }
    }
}

/// Split `Name,http...` at the first `,http`. Comment and directive lines never match.
fn split_txt_line(line: &str) -> Option<(&str, &str)> {
    if line.starts_with('#') {
        return None;
    }
    let idx = line.find(",http")?;
    Some((&line[..idx], &line[idx + 1..]))
}

/// Title part of an `#EXTINF` line, given the text after the `#EXTINF` prefix
fn extinf_title(rest: &str) -> &str {
    let rest = rest.strip_prefix(':').unwrap_or(rest);
    let rest = rest.strip_prefix('-').unwrap_or(rest);
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_digit() || c == '.');
    rest.strip_prefix(',').unwrap_or(rest)
}

/// Display names are the last comma-separated segment, trimmed
fn clean_name(raw: &str) -> String {
    raw.rsplit(',').next().unwrap_or_default().trim().to_string()
}
