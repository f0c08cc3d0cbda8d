//! Remote playlist sources

pub mod fetcher;

pub use fetcher::{HttpSourceFetcher, SourceFetcher, load_source_urls, parse_source_urls};
