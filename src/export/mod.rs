//! Serialization of the final channel sequence
//!
//! Renderers are pure functions returning the file contents; [`Exporter`]
//! decides file names and writes them under the output directory.

pub mod history;
pub mod m3u;
pub mod reports;
pub mod txt;

use chrono::{DateTime, Local};
use std::path::PathBuf;
use tracing::info;

use crate::config::ExporterConfig;
use crate::errors::{AppError, AppResult};
use crate::models::Channel;

pub struct Exporter {
    config: ExporterConfig,
    output_dir: PathBuf,
}

impl Exporter {
    pub fn new(config: ExporterConfig, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            output_dir: output_dir.into(),
        }
    }

    pub async fn ensure_output_dir(&self) -> AppResult<()> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| AppError::io(&self.output_dir, e))
    }

    /// Number of files [`Exporter::write_playlists`] produces
    pub fn playlist_count(&self) -> usize {
        if self.config.enable_history { 3 } else { 2 }
    }

    /// M3U, TXT and (when enabled) the history CSV, calling `on_written`
    /// after each file
    pub async fn write_playlists(
        &self,
        ordered: &[Channel],
        started_at: &DateTime<Local>,
        mut on_written: impl FnMut(),
    ) -> AppResult<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.playlist_count());

        let m3u = m3u::render_m3u(
            ordered,
            self.config.m3u_epg_url.as_deref(),
            self.config.m3u_logo_url.as_deref(),
        );
        written.push(self.write(&self.config.m3u_filename, m3u).await?);
        on_written();

        written.push(self.write(&self.config.txt_filename, txt::render_txt(ordered)).await?);
        on_written();

        if self.config.enable_history {
            let filename = history::history_filename(&self.config.history_filename_format, started_at);
            written.push(self.write(&filename, history::render_history(ordered)).await?);
            on_written();
        }

        Ok(written)
    }

    /// IPv4 and IPv6 listings
    pub async fn write_ip_split(&self, ordered: &[Channel]) -> AppResult<Vec<PathBuf>> {
        let (ipv4, ipv6) = txt::partition_by_family(ordered, self.config.ip_split_online_only);
        info!("Address family split: {} IPv4, {} IPv6 channels", ipv4.len(), ipv6.len());

        let ipv4_path = self
            .write(&self.config.ipv4_filename, txt::render_grouped(ipv4))
            .await?;
        let ipv6_path = self
            .write(&self.config.ipv6_filename, txt::render_grouped(ipv6))
            .await?;
        Ok(vec![ipv4_path, ipv6_path])
    }

    pub async fn write_unclassified(&self, names: &[String]) -> AppResult<PathBuf> {
        self.write(&self.config.unclassified_filename, reports::render_unclassified(names))
            .await
    }

    /// Written only when at least one URL failed
    pub async fn write_failed_urls(&self, urls: &[String]) -> AppResult<Option<PathBuf>> {
        if urls.is_empty() {
            return Ok(None);
        }
        let path = self
            .write(&self.config.failed_urls_filename, reports::render_failed_urls(urls))
            .await?;
        Ok(Some(path))
    }

    async fn write(&self, filename: &str, contents: String) -> AppResult<PathBuf> {
        let path = self.output_dir.join(filename);
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| AppError::io(&path, e))?;
        info!("Wrote {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fixture() -> Vec<Channel> {
        let mut a = Channel::new("A", "http://192.168.0.1/a", "News");
        a.mark_online(Duration::from_millis(250));
        let mut b = Channel::new("B", "http://tv.example.com/b", "News");
        b.mark_offline();
        let mut c = Channel::new("C", "http://[2001:db8::2]/c", "Sports");
        c.mark_online(Duration::from_millis(1500));
        vec![a, b, c]
    }

    #[tokio::test]
    async fn writes_every_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let config = ExporterConfig {
            enable_history: true,
            ..ExporterConfig::default()
        };
        let exporter = Exporter::new(config, dir.path().join("out"));
        exporter.ensure_output_dir().await.unwrap();

        let channels = fixture();
        let mut files = 0;
        let written = exporter
            .write_playlists(&channels, &Local::now(), || files += 1)
            .await
            .unwrap();
        assert_eq!(written.len(), 3);
        assert_eq!(files, 3);

        let txt = std::fs::read_to_string(dir.path().join("out/all.txt")).unwrap();
        assert_eq!(
            txt,
            "News,#genre#\nA,http://192.168.0.1/a\n\nSports,#genre#\nC,http://[2001:db8::2]/c\n"
        );

        let history = std::fs::read_to_string(&written[2]).unwrap();
        assert!(history.contains("B,News,offline,N/A,http://tv.example.com/b"));
        assert!(history.contains("C,Sports,online,1.50s,http://[2001:db8::2]/c"));

        let split = exporter.write_ip_split(&channels).await.unwrap();
        let ipv4 = std::fs::read_to_string(&split[0]).unwrap();
        assert_eq!(ipv4, "News,#genre#\nA,http://192.168.0.1/a\n");
        let ipv6 = std::fs::read_to_string(&split[1]).unwrap();
        assert_eq!(ipv6, "Sports,#genre#\nC,http://[2001:db8::2]/c\n");
    }

    #[tokio::test]
    async fn failed_urls_file_only_when_needed() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(ExporterConfig::default(), dir.path());

        assert!(exporter.write_failed_urls(&[]).await.unwrap().is_none());
        assert!(!dir.path().join("failed_urls.txt").exists());

        let path = exporter
            .write_failed_urls(&["http://a/1".to_string()])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "http://a/1\n");
    }

    #[tokio::test]
    async fn unwritable_output_dir_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        let exporter = Exporter::new(ExporterConfig::default(), blocker.join("out"));
        let err = exporter.ensure_output_dir().await.unwrap_err();
        assert!(matches!(err, AppError::Io { .. }));
    }
}
