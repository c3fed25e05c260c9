use std::{sync::Arc, time::Duration};

use strata_model::{BatchPolicy, JobSpec};
use taskvisor::TaskError;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::{
    check::CheckRegistry,
    events::{BatchEvent, BatchEventKind, Subscribers},
    executor::{ExecContext, JobExecutor, make_run_id},
    metrics::{JobOutcome, MetricsHandle},
};

/// Result of one executed job, sent back to the driver loop.
pub(crate) struct Finished {
    pub index: usize,
    pub outcome: JobOutcome,
    pub reason: Option<String>,
    pub duration: Duration,
}

/// Everything a worker needs, shared by all workers of one batch.
pub(crate) struct Worker {
    pub stage: Arc<str>,
    pub policy: BatchPolicy,
    pub executor: Arc<dyn JobExecutor>,
    pub checks: Arc<CheckRegistry>,
    pub metrics: MetricsHandle,
    pub subscribers: Subscribers,
}

impl Worker {
    /// Run one admitted job: execute, bound by timeout, then verify outputs.
    pub(crate) async fn run(&self, index: usize, job: JobSpec, cancel: CancellationToken) -> Finished {
        let run_id = make_run_id(&self.stage, &job.id);
        let ctx = ExecContext::new(run_id, &*self.stage, self.policy.threads_per_job, cancel);
        let job = Arc::new(job);

        trace!(stage = %self.stage, job = %job.id, run = ctx.run_id(), cmd = ?job.command_line(), "job admitted");
        self.metrics.record_job_started(&self.stage);
        self.subscribers
            .emit(BatchEvent::job(BatchEventKind::JobStarted, &self.stage, &job.id));

        let started = Instant::now();
        let result = self.execute(Arc::clone(&job), ctx).await;
        let (outcome, reason) = match result {
            Ok(()) => self.verify(Arc::clone(&job)).await,
            Err((outcome, reason)) => (outcome, Some(reason)),
        };
        let duration = started.elapsed();

        self.metrics
            .record_job_completed(&self.stage, outcome, duration.as_millis() as u64);
        self.publish(&job.id, outcome, reason.as_deref(), duration);

        Finished {
            index,
            outcome,
            reason,
            duration,
        }
    }

    /// Drive the executor on its own task so a panic or timeout cannot take the worker down.
    async fn execute(&self, job: Arc<JobSpec>, ctx: ExecContext) -> Result<(), (JobOutcome, String)> {
        let executor = Arc::clone(&self.executor);
        let token = ctx.cancel().clone();
        let mut handle = tokio::spawn(async move { executor.execute(&job, &ctx).await });

        let joined = match self.policy.job_timeout_ms {
            Some(ms) => match tokio::time::timeout(Duration::from_millis(ms), &mut handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    token.cancel();
                    handle.abort();
                    return Err((JobOutcome::Timeout, format!("timed out after {ms} ms")));
                }
            },
            None => handle.await,
        };

        match joined {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err((task_error_to_outcome(&e), e.to_string())),
            Err(e) => Err((JobOutcome::Failure, format!("executor task aborted: {e}"))),
        }
    }

    /// Postcondition check: a job that claims success must leave valid outputs.
    async fn verify(&self, job: Arc<JobSpec>) -> (JobOutcome, Option<String>) {
        if self.policy.verify_outputs.is_disabled() {
            return (JobOutcome::Success, None);
        }
        let checks = Arc::clone(&self.checks);
        match tokio::task::spawn_blocking(move || checks.first_invalid(&job)).await {
            Ok(Ok(None)) => (JobOutcome::Success, None),
            Ok(Ok(Some(reason))) => (JobOutcome::InvalidOutput, Some(reason)),
            Ok(Err(e)) => (JobOutcome::InvalidOutput, Some(e.to_string())),
            Err(e) => (JobOutcome::InvalidOutput, Some(format!("output check aborted: {e}"))),
        }
    }

    fn publish(&self, job: &str, outcome: JobOutcome, reason: Option<&str>, duration: Duration) {
        let kind = match outcome {
            JobOutcome::Success => BatchEventKind::JobSucceeded,
            JobOutcome::Failure | JobOutcome::InvalidOutput => BatchEventKind::JobFailed,
            JobOutcome::Timeout => BatchEventKind::JobTimedOut,
            JobOutcome::Canceled => BatchEventKind::JobCanceled,
        };
        let mut event = BatchEvent::job(kind, &self.stage, job).with_duration(duration);
        if let Some(reason) = reason {
            event = event.with_reason(reason);
        }
        self.subscribers.emit(event);

        match outcome {
            JobOutcome::Success => debug!(stage = %self.stage, job, ms = duration.as_millis() as u64, "job succeeded"),
            _ => warn!(stage = %self.stage, job, outcome = outcome.as_label(), reason, "job did not succeed"),
        }
    }
}

/// Classify an executor error.
pub(crate) fn task_error_to_outcome(error: &TaskError) -> JobOutcome {
    match error {
        TaskError::Timeout { .. } => JobOutcome::Timeout,
        TaskError::Canceled => JobOutcome::Canceled,
        _ => JobOutcome::Failure,
    }
}
