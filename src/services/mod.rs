//! Network-facing services used by the pipeline

pub mod stream_prober;

pub use stream_prober::{FailedUrls, HttpSpeedTester, ProbeFailure, ProbeMeasurement, StreamProber};
