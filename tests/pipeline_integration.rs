use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use m3u_aggregator::{
    classification::CategoryTemplate,
    config::Config,
    errors::AppError,
    filtering::MembershipList,
    models::Channel,
    pipeline::{Pipeline, PipelineInputs, ProgressFn, ProgressObserver, Stage},
    services::{FailedUrls, StreamProber},
    sources::SourceFetcher,
};

const TEMPLATE: &str = "\
央视频道,#genre#
CCTV-1|CCTV1|中央一台
CCTV-2

卫视频道,#genre#
湖南卫视
";

const TXT_SOURCE: &str = "\
央视,#genre#
CCTV1 HD,http://10.0.0.1/cctv1.m3u8
CCTV-2,http://tv.example.com/cctv2.m3u8$备用
湖南卫视,http://[2001:db8::5]/hunan.m3u8
Phoenix,http://tv.example.com/phoenix.m3u8
Shopping,http://ads.example.com/shop.m3u8
CCTV-2,http://blocked.example.com/cctv2.m3u8
";

const M3U_SOURCE: &str = "\
#EXTM3U
#EXTINF:-1 group-title=\"x\",中央一台
http://10.0.0.1/cctv1.m3u8
#EXTINF:-1,湖南卫视 高清
http://dead.example.com/hunan.m3u8
#EXTINF:-1,Phoenix
http://tv.example.com/phoenix2.m3u8
";

/// Serves canned content by URL; unknown URLs fail like a dead host
struct FakeFetcher {
    responses: HashMap<String, String>,
    calls: AtomicUsize,
}

#[async_trait]
impl SourceFetcher for FakeFetcher {
    async fn fetch_all(&self, urls: &[String], on_progress: &ProgressFn<'_>) -> Vec<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        urls.iter()
            .map(|url| {
                on_progress(1);
                self.responses.get(url).cloned().unwrap_or_default()
            })
            .collect()
    }
}

/// Everything is online except the listed URLs
struct FakeProber {
    dead: HashSet<String>,
}

#[async_trait]
impl StreamProber for FakeProber {
    async fn probe(
        &self,
        channels: Vec<Channel>,
        on_progress: &ProgressFn<'_>,
        failed_urls: &FailedUrls,
    ) -> Vec<Channel> {
        channels
            .into_iter()
            .map(|mut channel| {
                if self.dead.contains(&channel.url) {
                    channel.mark_offline();
                    failed_urls.insert(channel.url.clone());
                } else {
                    channel.mark_online(Duration::from_millis(120));
                }
                on_progress(1);
                channel
            })
            .collect()
    }
}

#[derive(Default)]
struct RecordingProgress {
    totals: Mutex<HashMap<Stage, usize>>,
    advanced: Mutex<HashMap<Stage, usize>>,
    finished: Mutex<Vec<Stage>>,
}

impl ProgressObserver for RecordingProgress {
    fn begin(&self, stage: Stage, total: usize) {
        self.totals.lock().unwrap().insert(stage, total);
    }

    fn advance(&self, stage: Stage, units: usize) {
        *self.advanced.lock().unwrap().entry(stage).or_default() += units;
    }

    fn finish(&self, stage: Stage) {
        self.finished.lock().unwrap().push(stage);
    }
}

fn config_for(output_dir: &Path) -> Config {
    let mut config = Config::default();
    config.paths.output_dir = output_dir.to_path_buf();
    config
}

fn inputs() -> PipelineInputs {
    PipelineInputs {
        source_urls: vec![
            "http://lists.example.com/a.txt".to_string(),
            "http://lists.example.com/b.m3u".to_string(),
            "http://lists.example.com/offline.txt".to_string(),
        ],
        template: CategoryTemplate::compile(TEMPLATE),
        blacklist: MembershipList::from_entries(["blocked.example.com"]),
        whitelist: MembershipList::from_entries(["tv.example.com/cctv2"]),
    }
}

fn fetcher() -> FakeFetcher {
    FakeFetcher {
        responses: HashMap::from([
            ("http://lists.example.com/a.txt".to_string(), TXT_SOURCE.to_string()),
            ("http://lists.example.com/b.m3u".to_string(), M3U_SOURCE.to_string()),
        ]),
        calls: AtomicUsize::new(0),
    }
}

fn prober() -> FakeProber {
    FakeProber {
        dead: HashSet::from(["http://dead.example.com/hunan.m3u8".to_string()]),
    }
}

fn read(dir: &Path, name: &str) -> String {
    std::fs::read_to_string(dir.join(name)).unwrap()
}

#[tokio::test]
async fn full_run_writes_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("outputs");
    let progress = Arc::new(RecordingProgress::default());

    let pipeline = Pipeline::new(
        config_for(&out),
        inputs(),
        Box::new(fetcher()),
        Box::new(prober()),
    )
    .with_progress(progress.clone());
    let summary = pipeline.run().await.unwrap();

    assert_eq!(summary.sources, 3);
    assert_eq!(summary.sources_fetched, 2);
    assert_eq!(summary.parsed, 9);
    assert_eq!(summary.in_template, 6);
    assert_eq!(summary.after_blacklist, 5);
    assert_eq!(summary.unique, 4);
    assert_eq!(summary.online, 3);
    assert_eq!(summary.unclassified, 2);
    assert_eq!(summary.failed_urls, 1);
    assert_eq!(summary.artifacts.len(), 6);

    assert_eq!(
        read(&out, "all.txt"),
        "央视频道,#genre#\n\
         CCTV-2,http://tv.example.com/cctv2.m3u8\n\
         CCTV-1,http://10.0.0.1/cctv1.m3u8\n\
         \n\
         卫视频道,#genre#\n\
         湖南卫视,http://[2001:db8::5]/hunan.m3u8\n"
    );

    assert_eq!(
        read(&out, "all.m3u"),
        "#EXTM3U\n\
         #EXTINF:-1 group-title=\"央视频道\",CCTV-2\n\
         http://tv.example.com/cctv2.m3u8\n\
         #EXTINF:-1 group-title=\"央视频道\",CCTV-1\n\
         http://10.0.0.1/cctv1.m3u8\n\
         #EXTINF:-1 group-title=\"卫视频道\",湖南卫视\n\
         http://[2001:db8::5]/hunan.m3u8\n"
    );

    assert_eq!(
        read(&out, "ipv4.txt"),
        "央视频道,#genre#\nCCTV-1,http://10.0.0.1/cctv1.m3u8\n"
    );
    assert_eq!(
        read(&out, "ipv6.txt"),
        "卫视频道,#genre#\n湖南卫视,http://[2001:db8::5]/hunan.m3u8\n"
    );
    assert_eq!(read(&out, "unclassified.txt"), "未分类的频道列表:\nPhoenix\nShopping\n");
    assert_eq!(read(&out, "failed_urls.txt"), "http://dead.example.com/hunan.m3u8\n");

    let totals = progress.totals.lock().unwrap().clone();
    let advanced = progress.advanced.lock().unwrap().clone();
    for stage in [Stage::Fetch, Stage::Parse, Stage::Classify, Stage::Probe, Stage::Export] {
        assert_eq!(
            totals.get(&stage).copied().unwrap_or_default(),
            advanced.get(&stage).copied().unwrap_or_default(),
            "progress for {stage}"
        );
    }
    assert_eq!(totals[&Stage::Parse], 2);
    assert_eq!(progress.finished.lock().unwrap().len(), 5);
}

#[tokio::test]
async fn history_and_logo_directives_when_enabled() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(dir.path());
    config.exporter.enable_history = true;
    config.exporter.m3u_logo_url = Some("http://logo.example.com/".to_string());

    let pipeline = Pipeline::new(config, inputs(), Box::new(fetcher()), Box::new(prober()));
    let summary = pipeline.run().await.unwrap();
    assert_eq!(summary.artifacts.len(), 7);

    let history_path = summary
        .artifacts
        .iter()
        .find(|p| p.extension().is_some_and(|ext| ext == "csv"))
        .unwrap();
    let file_name = history_path.file_name().unwrap().to_string_lossy().to_string();
    assert!(file_name.starts_with("history_"));
    assert_eq!(file_name.len(), "history_20240101_000000.csv".len());

    let history = std::fs::read_to_string(history_path).unwrap();
    let rows: Vec<&str> = history.split("\r\n").filter(|r| !r.is_empty()).collect();
    assert_eq!(rows.len(), 5);
    assert!(rows.contains(&"湖南卫视,卫视频道,offline,N/A,http://dead.example.com/hunan.m3u8"));
    assert!(rows.contains(&"CCTV-1,央视频道,online,0.12s,http://10.0.0.1/cctv1.m3u8"));

    let m3u = read(dir.path(), "all.m3u");
    assert_eq!(m3u.matches("#EXTVLCOPT:logo=\"http://logo.example.com/\"").count(), 3);
}

#[tokio::test]
async fn no_failures_means_no_failed_urls_file() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(
        config_for(dir.path()),
        inputs(),
        Box::new(fetcher()),
        Box::new(FakeProber { dead: HashSet::new() }),
    );
    let summary = pipeline.run().await.unwrap();

    assert_eq!(summary.failed_urls, 0);
    assert_eq!(summary.online, 4);
    assert!(!dir.path().join("failed_urls.txt").exists());

    // The dead-host channel is online now and sorts after the IPv6 one
    assert_eq!(
        read(dir.path(), "ipv6.txt"),
        "卫视频道,#genre#\n湖南卫视,http://[2001:db8::5]/hunan.m3u8\n"
    );
    assert!(read(dir.path(), "all.txt").ends_with(
        "湖南卫视,http://[2001:db8::5]/hunan.m3u8\n湖南卫视,http://dead.example.com/hunan.m3u8\n"
    ));
}

#[tokio::test]
async fn all_sources_failing_still_exports_empty_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = FakeFetcher {
        responses: HashMap::new(),
        calls: AtomicUsize::new(0),
    };
    let pipeline = Pipeline::new(config_for(dir.path()), inputs(), Box::new(fetcher), Box::new(prober()));
    let summary = pipeline.run().await.unwrap();

    assert_eq!(summary.parsed, 0);
    assert_eq!(read(dir.path(), "all.m3u"), "#EXTM3U\n");
    assert_eq!(read(dir.path(), "all.txt"), "");
    assert_eq!(read(dir.path(), "unclassified.txt"), "未分类的频道列表:\n");
}

#[tokio::test]
async fn unwritable_output_dir_fails_before_fetching() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "").unwrap();

    let fetcher = Arc::new(fetcher());
    struct SharedFetcher(Arc<FakeFetcher>);

    #[async_trait]
    impl SourceFetcher for SharedFetcher {
        async fn fetch_all(&self, urls: &[String], on_progress: &ProgressFn<'_>) -> Vec<String> {
            self.0.fetch_all(urls, on_progress).await
        }
    }

    let pipeline = Pipeline::new(
        config_for(&blocker.join("outputs")),
        inputs(),
        Box::new(SharedFetcher(fetcher.clone())),
        Box::new(prober()),
    );
    let err = pipeline.run().await.unwrap_err();

    assert!(matches!(err, AppError::Io { .. }));
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
}
