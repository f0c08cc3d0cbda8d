//! Turning fetched playlist text into candidate channel records

pub mod playlist_parser;

pub use playlist_parser::{ParsedRecords, PlaylistFormat, PlaylistParser};
