//! Narrow interfaces to metrics and tracing backends.
//!
//! Middleware only ever calls these traits; where samples end up is decided by
//! whoever constructs the pipeline. Every middleware that records takes an
//! `Option<Arc<dyn ...>>`, and `None` means the concern is switched off.
//!
//! [`MetricsFacade`] forwards to the [`metrics`] crate, so any installed
//! `metrics` recorder (Prometheus exporter, debugging recorder in tests)
//! receives the samples. [`TracingTracer`] creates [`tracing`] spans.

use metrics::{counter, histogram};
use std::time::Duration;
use tracing::Span;

/// Metric labels: static keys, dynamic values.
pub type Tags = [(&'static str, String)];

/// Counters and histograms.
pub trait MetricsRecorder: Send + Sync {
    /// Adds `value` to the counter `name`.
    fn add(&self, name: &str, tags: &Tags, value: u64);

    /// Records one sample in the histogram `name`.
    fn record(&self, name: &str, tags: &Tags, value: f64);

    fn increment(&self, name: &str, tags: &Tags) {
        self.add(name, tags, 1);
    }

    /// Records a duration in seconds.
    fn observe(&self, name: &str, tags: &Tags, duration: Duration) {
        self.record(name, tags, duration.as_secs_f64());
    }
}

/// [`MetricsRecorder`] backed by the global `metrics` recorder.
///
/// An optional prefix is prepended to every metric name as `{prefix}_{name}`.
#[derive(Debug, Clone, Default)]
pub struct MetricsFacade {
    prefix: Option<String>,
}

impl MetricsFacade {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    fn key(&self, name: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}_{name}"),
            None => name.to_string(),
        }
    }
}

impl MetricsRecorder for MetricsFacade {
    fn add(&self, name: &str, tags: &Tags, value: u64) {
        let labels: Vec<(&'static str, String)> = tags.to_vec();
        counter!(self.key(name), &labels).increment(value);
    }

    fn record(&self, name: &str, tags: &Tags, value: f64) {
        let labels: Vec<(&'static str, String)> = tags.to_vec();
        histogram!(self.key(name), &labels).record(value);
    }
}

/// Span factory.
pub trait Tracer: Send + Sync {
    /// Starts a span named after `operation`, as a child of `parent`.
    ///
    /// Implementations should declare an `outcome` field so callers can record
    /// `"success"` or `"failure"` once the call finishes.
    fn start_span(&self, operation: &str, parent: &Span) -> Span;
}

/// [`Tracer`] producing `tracing` spans at `INFO` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTracer;

impl Tracer for TracingTracer {
    fn start_span(&self, operation: &str, parent: &Span) -> Span {
        tracing::info_span!(
            parent: parent,
            "endpoint",
            operation = %operation,
            outcome = tracing::field::Empty,
            error = tracing::field::Empty,
        )
    }
}
