//! Logging setup and lightweight counters

use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` applies. Output goes
/// to stderr so command output on stdout stays parseable.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    // A subscriber may already be installed (tests, embedding callers)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Metrics handle for recording catalog counters
#[derive(Debug, Default)]
pub struct Metrics {
    refreshes: AtomicU64,
    handler_cache_hits: AtomicU64,
    handler_cache_misses: AtomicU64,
    handler_writes: AtomicU64,
    handler_write_failures: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refresh_completed(&self) {
        self.refreshes.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "refreshes", "Metric incremented");
    }

    pub fn handler_cache_hit(&self) {
        self.handler_cache_hits.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "handler_cache_hits", "Metric incremented");
    }

    pub fn handler_cache_miss(&self) {
        self.handler_cache_misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "handler_cache_misses", "Metric incremented");
    }

    pub fn handler_written(&self) {
        self.handler_writes.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "handler_writes", "Metric incremented");
    }

    pub fn handler_write_failed(&self) {
        self.handler_write_failures.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "handler_write_failures", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            refreshes: self.refreshes.load(Ordering::Relaxed),
            handler_cache_hits: self.handler_cache_hits.load(Ordering::Relaxed),
            handler_cache_misses: self.handler_cache_misses.load(Ordering::Relaxed),
            handler_writes: self.handler_writes.load(Ordering::Relaxed),
            handler_write_failures: self.handler_write_failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub refreshes: u64,
    pub handler_cache_hits: u64,
    pub handler_cache_misses: u64,
    pub handler_writes: u64,
    pub handler_write_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let metrics = Metrics::new();
        metrics.handler_cache_miss();
        metrics.handler_cache_hit();
        metrics.handler_cache_hit();
        metrics.handler_write_failed();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.handler_cache_hits, 2);
        assert_eq!(snapshot.handler_cache_misses, 1);
        assert_eq!(snapshot.handler_write_failures, 1);
        assert_eq!(snapshot.refreshes, 0);
    }
}
