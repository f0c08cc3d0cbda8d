//! End-to-end aggregation run
//!
//! Stages run strictly one after another and each is fully materialized
//! before the next begins. Only fetch and probe are concurrent, and both hand
//! their results back in input order.

use chrono::Local;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

use crate::classification::{
    CategoryTemplate, Classifier, NameNormalizer, OrderingEngine, classify_records,
};
use crate::config::{Config, PathsConfig};
use crate::errors::AppResult;
use crate::export::Exporter;
use crate::filtering::{self, MembershipList};
use crate::ingestor::PlaylistParser;
use crate::pipeline::progress::{NoopProgress, ProgressObserver, Stage};
use crate::services::{FailedUrls, HttpSpeedTester, StreamProber};
use crate::sources::{HttpSourceFetcher, SourceFetcher, load_source_urls};
use crate::utils::format_duration;

/// Everything read from disk before a run starts
#[derive(Debug, Clone)]
pub struct PipelineInputs {
    pub source_urls: Vec<String>,
    pub template: CategoryTemplate,
    pub blacklist: MembershipList,
    pub whitelist: MembershipList,
}

impl PipelineInputs {
    /// Source list and template are required; the membership lists are optional
    pub fn load(paths: &PathsConfig) -> AppResult<Self> {
        let source_urls = load_source_urls(&paths.urls)?;
        info!("Loaded {} source URLs from {}", source_urls.len(), paths.urls.display());

        Ok(Self {
            source_urls,
            template: CategoryTemplate::load(&paths.templates)?,
            blacklist: MembershipList::load(&paths.blacklist, "blacklist")?,
            whitelist: MembershipList::load(&paths.whitelist, "whitelist")?,
        })
    }
}

/// Counts and artifacts of a finished run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub sources: usize,
    /// Sources that returned non-empty content
    pub sources_fetched: usize,
    pub parsed: usize,
    pub in_template: usize,
    pub after_blacklist: usize,
    pub unique: usize,
    pub online: usize,
    pub unclassified: usize,
    pub failed_urls: usize,
    pub artifacts: Vec<PathBuf>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn log(&self) {
        info!(
            "Sources: {}/{} fetched, {} channels parsed",
            self.sources_fetched, self.sources, self.parsed
        );
        info!(
            "Filtering: {} in template, {} after blacklist, {} unique URLs",
            self.in_template, self.after_blacklist, self.unique
        );
        info!(
            "Online channels: {}/{} ({} failed URLs, {} unclassified names)",
            self.online, self.unique, self.failed_urls, self.unclassified
        );
        for artifact in &self.artifacts {
            info!("Output: {}", artifact.display());
        }
        info!("Run finished in {}", format_duration(self.elapsed));
    }
}

pub struct Pipeline {
    config: Config,
    inputs: PipelineInputs,
    fetcher: Box<dyn SourceFetcher>,
    prober: Box<dyn StreamProber>,
    progress: Arc<dyn ProgressObserver>,
}

impl Pipeline {
    pub fn new(
        config: Config,
        inputs: PipelineInputs,
        fetcher: Box<dyn SourceFetcher>,
        prober: Box<dyn StreamProber>,
    ) -> Self {
        Self {
            config,
            inputs,
            fetcher,
            prober,
            progress: Arc::new(NoopProgress),
        }
    }

    /// Load inputs and build the HTTP collaborators. Any failure here happens
    /// before a single request is sent.
    pub fn from_config(config: Config) -> AppResult<Self> {
        let inputs = PipelineInputs::load(&config.paths)?;
        let fetcher = HttpSourceFetcher::new(&config.fetcher)?;
        let prober = HttpSpeedTester::new(config.tester.clone())?;
        Ok(Self::new(config, inputs, Box::new(fetcher), Box::new(prober)))
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressObserver>) -> Self {
        self.progress = progress;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn run(&self) -> AppResult<RunSummary> {
        let started_at = Local::now();
        let timer = Instant::now();
        let mut summary = RunSummary {
            sources: self.inputs.source_urls.len(),
            ..RunSummary::default()
        };

        let exporter = Exporter::new(self.config.exporter.clone(), &self.config.paths.output_dir);
        exporter.ensure_output_dir().await?;

        // Fetch
        self.progress.begin(Stage::Fetch, summary.sources);
        let contents = self
            .fetcher
            .fetch_all(&self.inputs.source_urls, &|n: usize| {
                self.progress.advance(Stage::Fetch, n)
            })
            .await;
        self.progress.finish(Stage::Fetch);

        // Parse
        let non_empty: Vec<&str> = contents
            .iter()
            .map(String::as_str)
            .filter(|content| !content.trim().is_empty())
            .collect();
        summary.sources_fetched = non_empty.len();

        let parser = PlaylistParser::with_removed_params(self.config.url_filter.remove_params.clone());
        self.progress.begin(Stage::Parse, non_empty.len());
        let mut records = Vec::new();
        for content in non_empty {
            records.extend(parser.parse(content));
            self.progress.advance(Stage::Parse, 1);
        }
        self.progress.finish(Stage::Parse);
        summary.parsed = records.len();
        info!(
            "Parsed {} channel records from {}/{} sources",
            summary.parsed, summary.sources_fetched, summary.sources
        );

        // Normalize and classify
        let template = &self.inputs.template;
        let normalizer = NameNormalizer::new(template, &self.config.normalizer.suffixes);
        self.progress.begin(Stage::Classify, records.len());
        let classified = classify_records(records, &normalizer, |n| {
            self.progress.advance(Stage::Classify, n)
        });
        self.progress.finish(Stage::Classify);

        let unclassified = filtering::unclassified_names(&classified);
        summary.unclassified = unclassified.len();

        // Filter and dedupe
        let classifier = Classifier::new(template);
        let in_template = filtering::retain_in_template(classified, &classifier);
        summary.in_template = in_template.len();
        info!("Channels in template: {}/{}", summary.in_template, summary.parsed);

        let allowed = filtering::remove_blacklisted(in_template, &self.inputs.blacklist);
        summary.after_blacklist = allowed.len();
        info!("Channels after blacklist: {}", summary.after_blacklist);

        let unique = filtering::dedupe_by_url(allowed);
        summary.unique = unique.len();
        info!("Channels after URL dedupe: {}/{}", summary.unique, summary.after_blacklist);

        // Probe
        let failed_urls = FailedUrls::new();
        self.progress.begin(Stage::Probe, unique.len());
        let probed = self
            .prober
            .probe(
                unique,
                &|n: usize| self.progress.advance(Stage::Probe, n),
                &failed_urls,
            )
            .await;
        self.progress.finish(Stage::Probe);
        summary.online = probed.iter().filter(|c| c.is_online()).count();
        let failed = failed_urls.to_sorted_vec();
        summary.failed_urls = failed.len();
        info!("Probe finished: {}/{} online", summary.online, summary.unique);

        // Order
        let ordered = OrderingEngine::new(&normalizer, &self.inputs.whitelist).order(probed);

        // Export
        let export_units = exporter.playlist_count() + 2 + usize::from(!failed.is_empty());
        self.progress.begin(Stage::Export, export_units);
        let mut artifacts = exporter
            .write_playlists(&ordered, &started_at, || self.progress.advance(Stage::Export, 1))
            .await?;
        artifacts.extend(exporter.write_ip_split(&ordered).await?);
        self.progress.advance(Stage::Export, 1);
        artifacts.push(exporter.write_unclassified(&unclassified).await?);
        self.progress.advance(Stage::Export, 1);
        if let Some(path) = exporter.write_failed_urls(&failed).await? {
            artifacts.push(path);
            self.progress.advance(Stage::Export, 1);
        }
        self.progress.finish(Stage::Export);

        summary.artifacts = artifacts;
        summary.elapsed = timer.elapsed();
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_template_stops_input_loading() {
        let dir = tempfile::tempdir().unwrap();
        let urls = dir.path().join("urls.txt");
        std::fs::write(&urls, "http://example.com/a.txt\n").unwrap();

        let paths = PathsConfig {
            urls,
            templates: dir.path().join("templates.txt"),
            blacklist: dir.path().join("blacklist.txt"),
            whitelist: dir.path().join("whitelist.txt"),
            output_dir: dir.path().join("out"),
        };
        let err = PipelineInputs::load(&paths).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn optional_lists_default_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let urls = dir.path().join("urls.txt");
        let templates = dir.path().join("templates.txt");
        std::fs::write(&urls, "# none yet\n").unwrap();
        std::fs::write(&templates, "News,#genre#\nCCTV\n").unwrap();

        let paths = PathsConfig {
            urls,
            templates,
            blacklist: dir.path().join("blacklist.txt"),
            whitelist: dir.path().join("whitelist.txt"),
            output_dir: dir.path().join("out"),
        };
        let inputs = PipelineInputs::load(&paths).unwrap();
        assert!(inputs.source_urls.is_empty());
        assert_eq!(inputs.template.len(), 1);
        assert!(inputs.blacklist.is_empty());
        assert!(inputs.whitelist.is_empty());
    }
}
