use crate::metrics::backend::{JobOutcome, MetricsBackend};

/// Metrics backend that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpMetrics;

impl MetricsBackend for NoOpMetrics {
    #[inline(always)]
    fn record_job_started(&self, _: &str) {}

    #[inline(always)]
    fn record_job_completed(&self, _: &str, _: JobOutcome, _: u64) {}

    #[inline(always)]
    fn record_job_skipped(&self, _: &str) {}
}
