//! Per-stage progress reporting

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

/// Callback handed to collaborators; receives the number of finished units
pub type ProgressFn<'a> = dyn Fn(usize) + Send + Sync + 'a;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Fetch,
    Parse,
    Classify,
    Probe,
    Export,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Fetch => "Fetching sources",
            Stage::Parse => "Parsing playlists",
            Stage::Classify => "Classifying channels",
            Stage::Probe => "Probing streams",
            Stage::Export => "Writing outputs",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Receives progress events from the orchestrator.
///
/// `advance` may be called from several probe or fetch tasks at once.
pub trait ProgressObserver: Send + Sync {
    fn begin(&self, stage: Stage, total: usize);
    fn advance(&self, stage: Stage, units: usize);
    fn finish(&self, stage: Stage);
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgress;

impl ProgressObserver for NoopProgress {
    fn begin(&self, _stage: Stage, _total: usize) {}
    fn advance(&self, _stage: Stage, _units: usize) {}
    fn finish(&self, _stage: Stage) {}
}

fn stage_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} {msg:<22} [{elapsed_precise}] [{bar:40.green/white}] {pos}/{len}")
        .map(|style| style.progress_chars("=> "))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

/// One terminal progress bar per stage
pub struct ConsoleProgress {
    multi: MultiProgress,
    bars: Mutex<HashMap<Stage, ProgressBar>>,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            bars: Mutex::new(HashMap::new()),
        }
    }

    fn with_bar(&self, stage: Stage, f: impl FnOnce(&ProgressBar)) {
        let bars = match self.bars.lock() {
            Ok(bars) => bars,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(bar) = bars.get(&stage) {
            f(bar);
        }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for ConsoleProgress {
    fn begin(&self, stage: Stage, total: usize) {
        let bar = self.multi.add(ProgressBar::new(total as u64));
        bar.set_style(stage_style());
        bar.set_message(stage.label());
        bar.enable_steady_tick(Duration::from_millis(250));

        let mut bars = match self.bars.lock() {
            Ok(bars) => bars,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = bars.insert(stage, bar) {
            previous.finish_and_clear();
        }
    }

    fn advance(&self, stage: Stage, units: usize) {
        self.with_bar(stage, |bar| bar.inc(units as u64));
    }

    fn finish(&self, stage: Stage) {
        self.with_bar(stage, |bar| bar.finish_with_message(format!("{} done", stage.label())));
    }
}
