// Diagnostics counters
//
// Lightweight counters for what the engine did inside a hooked process.
// Dumped via log_summary() so a bug report's log shows at a glance whether
// the module attached, what it wrote, and how queries were answered.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Per-process engine metrics
///
/// Uses atomic operations for thread-safe tracking without locks; capability
/// queries arrive concurrently from the hooked application's threads.
#[derive(Debug)]
pub struct Metrics {
    /// Process-load callbacks that installed the engine
    pub processes_attached: AtomicUsize,

    /// Process-load callbacks skipped (disabled, package mismatch)
    pub processes_skipped: AtomicUsize,

    /// Preference-store loads that failed (module treated as inactive).
    /// Nonzero here distinguishes "could not read settings" from
    /// "settings said spoof nothing".
    pub config_load_failures: AtomicUsize,

    /// Build-identity fields written successfully
    pub identity_fields_written: AtomicU64,

    /// Version-identity fields written successfully
    pub version_fields_written: AtomicU64,

    /// Surface writes that failed and aborted their surface
    pub identity_write_failures: AtomicU64,

    /// Capability queries short-circuited to true
    pub queries_granted: AtomicU64,

    /// Capability queries short-circuited to false
    pub queries_denied: AtomicU64,

    /// Capability queries deferred to the original implementation
    pub queries_passed_through: AtomicU64,

    /// Engine load time
    start_time: Instant,
}

impl Metrics {
    /// Create a new Metrics instance
    pub fn new() -> Self {
        Self {
            processes_attached: AtomicUsize::new(0),
            processes_skipped: AtomicUsize::new(0),
            config_load_failures: AtomicUsize::new(0),
            identity_fields_written: AtomicU64::new(0),
            version_fields_written: AtomicU64::new(0),
            identity_write_failures: AtomicU64::new(0),
            queries_granted: AtomicU64::new(0),
            queries_denied: AtomicU64::new(0),
            queries_passed_through: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_process_attached(&self) {
        self.processes_attached.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_process_skipped(&self) {
        self.processes_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_config_load_failure(&self) {
        self.config_load_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_identity_field_written(&self) {
        self.identity_fields_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_version_field_written(&self) {
        self.version_fields_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_identity_write_failure(&self) {
        self.identity_write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_query_granted(&self) {
        self.queries_granted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_query_denied(&self) {
        self.queries_denied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_query_passed_through(&self) {
        self.queries_passed_through.fetch_add(1, Ordering::Relaxed);
    }

    /// Time since the engine was loaded into this process
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Log a metrics summary
    pub fn log_summary(&self) {
        tracing::info!("=== Spoofing Engine Metrics ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Processes: {} attached, {} skipped, {} config failures",
            self.processes_attached.load(Ordering::Relaxed),
            self.processes_skipped.load(Ordering::Relaxed),
            self.config_load_failures.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Identity writes: {} build fields, {} version fields, {} failures",
            self.identity_fields_written.load(Ordering::Relaxed),
            self.version_fields_written.load(Ordering::Relaxed),
            self.identity_write_failures.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Queries: {} granted, {} denied, {} passed through",
            self.queries_granted.load(Ordering::Relaxed),
            self.queries_denied.load(Ordering::Relaxed),
            self.queries_passed_through.load(Ordering::Relaxed)
        );
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new();
        assert_eq!(metrics.processes_attached.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.queries_granted.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_record_query_outcomes() {
        let metrics = Metrics::new();

        metrics.record_query_granted();
        metrics.record_query_granted();
        metrics.record_query_denied();
        metrics.record_query_passed_through();

        assert_eq!(metrics.queries_granted.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.queries_denied.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.queries_passed_through.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_record_process_outcomes() {
        let metrics = Metrics::new();

        metrics.record_process_attached();
        metrics.record_process_skipped();
        metrics.record_config_load_failure();

        assert_eq!(metrics.processes_attached.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.processes_skipped.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.config_load_failures.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_record_identity_writes() {
        let metrics = Metrics::new();

        metrics.record_identity_field_written();
        metrics.record_version_field_written();
        metrics.record_identity_write_failure();

        assert_eq!(metrics.identity_fields_written.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.version_fields_written.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.identity_write_failures.load(Ordering::Relaxed), 1);
    }
}
