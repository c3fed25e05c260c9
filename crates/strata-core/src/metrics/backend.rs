use std::sync::Arc;

/// How a job that left the pending queue ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// Executor reported success and outputs passed verification.
    Success,
    /// Executor reported failure.
    Failure,
    /// Executor reported success but an output failed its validity rule.
    InvalidOutput,
    /// Job exceeded the batch's per-job timeout.
    Timeout,
    /// Job was canceled, either before it started or while running.
    Canceled,
}

impl JobOutcome {
    /// Label value for metrics.
    #[inline]
    pub fn as_label(&self) -> &'static str {
        match self {
            JobOutcome::Success => "success",
            JobOutcome::Failure => "failure",
            JobOutcome::InvalidOutput => "invalid_output",
            JobOutcome::Timeout => "timeout",
            JobOutcome::Canceled => "canceled",
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Success)
    }
}

/// Backend metrics collection interface.
///
/// All methods are called from worker tasks and must not block.
pub trait MetricsBackend: Send + Sync + 'static {
    /// A job was admitted and its executor is about to run.
    fn record_job_started(&self, stage: &str);

    /// A job reached a terminal state after running.
    ///
    /// # Arguments
    /// - `stage`: Stage the job belongs to
    /// - `outcome`: How the job ended
    /// - `duration_ms`: Wall time spent in the executor
    fn record_job_completed(&self, stage: &str, outcome: JobOutcome, duration_ms: u64);

    /// A job was dropped by the resume pre-filter.
    fn record_job_skipped(&self, stage: &str);
}

/// Shared handle to a metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
