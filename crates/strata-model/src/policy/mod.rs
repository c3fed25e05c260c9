mod cancel;
pub use cancel::CancelMode;

use serde::{Deserialize, Serialize};

use crate::{
    Flag, TimeoutMs,
    error::{ModelError, ModelResult},
};

/// Execution policy shared by every job of one batch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BatchPolicy {
    /// Upper bound on jobs running at the same time.
    pub max_concurrency: usize,
    /// Thread budget handed to each external process.
    pub threads_per_job: usize,
    /// Skip jobs whose outputs already pass their validity rule.
    pub resume: Flag,
    /// Re-check outputs right after a job reports success.
    pub verify_outputs: Flag,
    /// Per-job wall clock limit; `None` waits indefinitely.
    pub job_timeout_ms: Option<TimeoutMs>,
    /// What cancellation does to jobs already running.
    pub cancel: CancelMode,
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self {
            max_concurrency: 1,
            threads_per_job: 1,
            resume: Flag::disabled(),
            verify_outputs: Flag::enabled(),
            job_timeout_ms: None,
            cancel: CancelMode::default(),
        }
    }
}

impl BatchPolicy {
    /// Policy allowing `max_concurrency` parallel jobs, other fields default.
    pub fn with_concurrency(max_concurrency: usize) -> Self {
        Self {
            max_concurrency,
            ..Self::default()
        }
    }

    pub fn resume(mut self, resume: bool) -> Self {
        self.resume = resume.into();
        self
    }

    pub fn validate(&self) -> ModelResult<()> {
        if self.max_concurrency == 0 {
            return Err(ModelError::Invalid("maxConcurrency must be at least 1".into()));
        }
        if self.threads_per_job == 0 {
            return Err(ModelError::Invalid("threadsPerJob must be at least 1".into()));
        }
        if self.job_timeout_ms == Some(0) {
            return Err(ModelError::Invalid("jobTimeoutMs cannot be zero".into()));
        }
        Ok(())
    }
}
