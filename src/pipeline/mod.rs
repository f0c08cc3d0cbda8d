//! Stage sequencing and progress reporting

pub mod orchestrator;
pub mod progress;

pub use orchestrator::{Pipeline, PipelineInputs, RunSummary};
pub use progress::{ConsoleProgress, NoopProgress, ProgressFn, ProgressObserver, Stage};
