//! Batch job driver.
//!
//! Runs one [`Batch`] of independent jobs under a bounded worker pool:
//! resume pre-filter, admission in submission order, per-job timeout,
//! output verification and a [`BatchReport`] once every job is terminal.
mod batch;
pub use batch::Batch;

mod report;
pub use report::{BatchReport, JobRecord};

mod state;
pub use state::JobState;

mod worker;
use worker::Worker;

use std::{sync::Arc, time::Duration};

use strata_model::{CancelMode, JobSpec};
use tokio::{sync::Semaphore, task::JoinSet, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    check::CheckRegistry,
    error::CoreError,
    events::{BatchEvent, BatchEventKind, Subscribe, Subscribers},
    executor::JobExecutor,
    metrics::{JobOutcome, MetricsHandle, noop_metrics},
};

/// Runs batches against one executor.
///
/// A driver holds no per-batch state and can run any number of batches,
/// one after another or concurrently.
#[derive(Clone)]
pub struct BatchDriver {
    executor: Arc<dyn JobExecutor>,
    checks: Arc<CheckRegistry>,
    metrics: MetricsHandle,
    subscribers: Subscribers,
}

impl BatchDriver {
    /// Driver with built-in checks, no metrics and no subscribers.
    pub fn new(executor: Arc<dyn JobExecutor>) -> Self {
        Self {
            executor,
            checks: Arc::new(CheckRegistry::new()),
            metrics: noop_metrics(),
            subscribers: Subscribers::default(),
        }
    }

    pub fn with_checks(mut self, checks: CheckRegistry) -> Self {
        self.checks = Arc::new(checks);
        self
    }

    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = Subscribers::new(subscribers);
        self
    }

    pub fn checks(&self) -> &CheckRegistry {
        &self.checks
    }

    /// Run every job of `batch` and return once all of them are terminal.
    ///
    /// Job failures are reported in the [`BatchReport`], never as `Err`. The
    /// call fails only when the batch references an unregistered check.
    ///
    /// After `cancel` fires no further job is admitted. Running jobs finish
    /// normally under [`CancelMode::Graceful`] and see their context token
    /// fire under [`CancelMode::Hard`].
    pub async fn run(
        &self,
        batch: Batch,
        cancel: &CancellationToken,
    ) -> Result<BatchReport, CoreError> {
        let started = Instant::now();
        let (stage, jobs, policy) = batch.into_parts();
        self.checks.ensure_resolvable(&jobs)?;

        let stage_tag: Arc<str> = Arc::from(stage.as_str());
        let mut records: Vec<JobRecord> = jobs
            .iter()
            .enumerate()
            .map(|(i, job)| JobRecord::pending(i, &job.id))
            .collect();

        info!(
            stage = %stage_tag,
            jobs = jobs.len(),
            concurrency = policy.max_concurrency,
            resume = %policy.resume,
            executor = self.executor.name(),
            "batch started"
        );
        self.subscribers.emit(
            BatchEvent::batch(BatchEventKind::BatchStarted, &stage_tag).with_count(jobs.len()),
        );

        let (jobs, satisfied) = if policy.resume.is_enabled() {
            self.satisfied(jobs).await?
        } else {
            let none = vec![false; jobs.len()];
            (jobs, none)
        };

        let mut queue = Vec::with_capacity(jobs.len());
        for ((index, job), done) in jobs.into_iter().enumerate().zip(satisfied) {
            if done {
                debug!(stage = %stage_tag, job = %job.id, "outputs present, job skipped");
                records[index].skip();
                self.metrics.record_job_skipped(&stage_tag);
                self.subscribers
                    .emit(BatchEvent::job(BatchEventKind::JobSkipped, &stage_tag, &job.id));
                continue;
            }
            queue.push((index, job));
        }

        let worker = Arc::new(Worker {
            stage: Arc::clone(&stage_tag),
            policy: policy.clone(),
            executor: Arc::clone(&self.executor),
            checks: Arc::clone(&self.checks),
            metrics: Arc::clone(&self.metrics),
            subscribers: self.subscribers.clone(),
        });
        let semaphore = Arc::new(Semaphore::new(policy.max_concurrency));
        let mut set = JoinSet::new();

        let mut pending = queue.into_iter();
        while let Some((index, job)) = pending.next() {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                permit = Arc::clone(&semaphore).acquire_owned() => permit.ok(),
            };
            let Some(permit) = permit else {
                warn!(stage = %stage_tag, "cancel requested, remaining jobs not started");
                records[index].cancel_before_start();
                for (rest, _) in pending.by_ref() {
                    records[rest].cancel_before_start();
                }
                break;
            };

            records[index].start();
            let token = match policy.cancel {
                CancelMode::Hard => cancel.child_token(),
                CancelMode::Graceful => CancellationToken::new(),
            };
            let worker = Arc::clone(&worker);
            set.spawn(async move {
                let _permit = permit;
                worker.run(index, job, token).await
            });
        }

        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(done) => records[done.index].finish(done.outcome, done.reason, done.duration),
                Err(e) => error!(stage = %stage_tag, error = %e, "batch worker lost"),
            }
        }
        for record in records.iter_mut().filter(|r| !r.state.is_terminal()) {
            record.finish(JobOutcome::Failure, Some("worker lost".into()), Duration::ZERO);
        }

        let report = BatchReport {
            stage,
            records,
            elapsed: started.elapsed(),
            canceled: cancel.is_cancelled(),
        };

        let kind = if report.canceled {
            BatchEventKind::BatchCanceled
        } else {
            BatchEventKind::BatchCompleted
        };
        self.subscribers.emit(
            BatchEvent::batch(kind, &stage_tag)
                .with_count(report.failed())
                .with_duration(report.elapsed),
        );
        if report.is_success() {
            info!(stage = %stage_tag, ms = report.elapsed.as_millis() as u64, "{report}");
        } else {
            warn!(stage = %stage_tag, failed = ?report.failed_jobs(), "{report}");
        }
        Ok(report)
    }

    /// Resume pre-filter. Checks read files, so they run off the runtime threads.
    async fn satisfied(&self, jobs: Vec<JobSpec>) -> Result<(Vec<JobSpec>, Vec<bool>), CoreError> {
        let checks = Arc::clone(&self.checks);
        let (jobs, satisfied) = tokio::task::spawn_blocking(move || {
            let satisfied = jobs
                .iter()
                .map(|job| checks.job_satisfied(job))
                .collect::<Result<Vec<_>, _>>();
            (jobs, satisfied)
        })
        .await
        .map_err(|e| CoreError::CheckAborted(e.to_string()))?;
        Ok((jobs, satisfied?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        fs,
        path::Path,
        sync::{
            Mutex,
            atomic::{AtomicUsize, Ordering},
        },
    };

    use strata_model::{BatchPolicy, JobSpec, OutputSpec, ValidityRule};
    use taskvisor::TaskError;

    use crate::{
        events::BatchEvent,
        executor::{ExecContext, FnExecutor},
    };

    fn job(dir: &Path, id: &str) -> JobSpec {
        JobSpec::new(id, "tool", OutputSpec::new(dir.join(format!("{id}.ssv"))))
    }

    fn jobs(dir: &Path, n: usize) -> Vec<JobSpec> {
        (1..=n).map(|i| job(dir, &format!("p{i}"))).collect()
    }

    /// Sleeps `delay_ms`, fails for `fail_id`, writes the output otherwise.
    fn writer(delay_ms: u64, fail_id: &'static str) -> Arc<dyn JobExecutor> {
        FnExecutor::arc("writer", move |job: JobSpec, _ctx: ExecContext| async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            if job.id == fail_id {
                return Err(TaskError::Fail {
                    reason: "exit code 1".into(),
                });
            }
            fs::write(&job.output.path, b"1 2 3\n").map_err(|e| TaskError::Fail {
                reason: e.to_string(),
            })
        })
    }

    #[derive(Default)]
    struct Kinds(Mutex<Vec<BatchEventKind>>);

    impl Subscribe for Kinds {
        fn on_event(&self, event: &BatchEvent) {
            self.0.lock().unwrap().push(event.kind);
        }

        fn name(&self) -> &'static str {
            "kinds"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failure_is_isolated_and_pool_is_bounded_in_time() {
        let dir = tempfile::tempdir().unwrap();
        let batch = Batch::new("bcf", jobs(dir.path(), 5), BatchPolicy::with_concurrency(2)).unwrap();
        let driver = BatchDriver::new(writer(100, "p3"));

        let t0 = Instant::now();
        let report = driver.run(batch, &CancellationToken::new()).await.unwrap();
        let elapsed = t0.elapsed();

        assert_eq!(report.succeeded(), 4);
        assert_eq!(report.failed_jobs(), ["p3"]);
        assert_eq!(report.record("p3").unwrap().outcome, Some(JobOutcome::Failure));
        assert!(!report.is_success());
        assert!(elapsed >= Duration::from_millis(300), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(400), "{elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn never_more_than_max_concurrency_jobs_run() {
        let dir = tempfile::tempdir().unwrap();
        let current = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let (c, p) = (Arc::clone(&current), Arc::clone(&peak));
        let exec = FnExecutor::arc("count", move |job: JobSpec, _ctx: ExecContext| {
            let (c, p) = (Arc::clone(&c), Arc::clone(&p));
            async move {
                let now = c.fetch_add(1, Ordering::SeqCst) + 1;
                p.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                c.fetch_sub(1, Ordering::SeqCst);
                fs::write(&job.output.path, b"x").map_err(|e| TaskError::Fail {
                    reason: e.to_string(),
                })
            }
        });

        let batch = Batch::new("segii", jobs(dir.path(), 10), BatchPolicy::with_concurrency(3)).unwrap();
        let report = BatchDriver::new(exec).run(batch, &CancellationToken::new()).await.unwrap();

        assert!(report.is_success());
        assert_eq!(peak.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn resume_skips_jobs_with_valid_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let all = jobs(dir.path(), 5);
        for done in &all[..3] {
            fs::write(&done.output.path, b"done").unwrap();
        }

        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let exec = FnExecutor::arc("count", move |job: JobSpec, _ctx: ExecContext| {
            seen.fetch_add(1, Ordering::SeqCst);
            async move {
                fs::write(&job.output.path, b"new").map_err(|e| TaskError::Fail {
                    reason: e.to_string(),
                })
            }
        });

        let batch = Batch::new("bcp", all, BatchPolicy::with_concurrency(4).resume(true)).unwrap();
        let report = BatchDriver::new(exec).run(batch, &CancellationToken::new()).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!((report.executed(), report.skipped()), (2, 3));
        assert!(report.is_success());
        assert!(!report.fully_skipped());
        assert_eq!(fs::read(dir.path().join("p1.ssv")).unwrap(), b"done");
        assert_eq!(fs::read(dir.path().join("p5.ssv")).unwrap(), b"new");
    }

    /// Blocks its thread for `delay` before reporting whether the file exists.
    struct SlowExists(Duration);

    impl crate::check::OutputCheck for SlowExists {
        fn name(&self) -> &str {
            "slow-exists"
        }

        fn check(&self, path: &Path) -> bool {
            std::thread::sleep(self.0);
            path.exists()
        }
    }

    #[tokio::test]
    async fn slow_output_checks_do_not_stall_the_runtime() {
        let dir = tempfile::tempdir().unwrap();
        let all: Vec<JobSpec> = (1..=4)
            .map(|i| {
                let path = dir.path().join(format!("p{i}.ssv"));
                let output = OutputSpec::new(path).with_validity(ValidityRule::Named("slow-exists".into()));
                JobSpec::new(format!("p{i}"), "tool", output)
            })
            .collect();
        for done in &all[..2] {
            fs::write(&done.output.path, b"done").unwrap();
        }
        let mut checks = CheckRegistry::new();
        checks
            .register("slow-exists", Arc::new(SlowExists(Duration::from_millis(100))))
            .unwrap();

        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let ticker = tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_millis(10)).await;
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        let batch = Batch::new("bcp", all, BatchPolicy::with_concurrency(1).resume(true)).unwrap();
        let report = BatchDriver::new(writer(0, "none"))
            .with_checks(checks)
            .run(batch, &CancellationToken::new())
            .await
            .unwrap();
        ticker.abort();

        assert!(report.is_success());
        assert_eq!((report.executed(), report.skipped()), (2, 2));
        assert!(ticks.load(Ordering::SeqCst) >= 10, "runtime stalled during checks");
    }

    #[tokio::test]
    async fn resume_with_all_outputs_present_runs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let all = jobs(dir.path(), 2);
        for done in &all {
            fs::write(&done.output.path, b"done").unwrap();
        }
        let kinds = Arc::new(Kinds::default());
        let driver = BatchDriver::new(writer(0, "")).with_subscribers(vec![kinds.clone()]);

        let batch = Batch::new("seg", all, BatchPolicy::default().resume(true)).unwrap();
        let report = driver.run(batch, &CancellationToken::new()).await.unwrap();

        assert!(report.fully_skipped());
        assert_eq!(report.executed(), 0);
        assert_eq!(
            *kinds.0.lock().unwrap(),
            [
                BatchEventKind::BatchStarted,
                BatchEventKind::JobSkipped,
                BatchEventKind::JobSkipped,
                BatchEventKind::BatchCompleted,
            ]
        );
    }

    #[tokio::test]
    async fn missing_secondary_output_defeats_resume() {
        let dir = tempfile::tempdir().unwrap();
        let spec = job(dir.path(), "p1")
            .with_secondary(OutputSpec::new(dir.path().join("p1_sal.ssv")));
        fs::write(&spec.output.path, b"1").unwrap();

        let batch = Batch::new("order", vec![spec], BatchPolicy::default().resume(true)).unwrap();
        let exec = FnExecutor::arc("both", |job: JobSpec, _ctx: ExecContext| async move {
            for out in job.outputs() {
                fs::write(&out.path, b"1").map_err(|e| TaskError::Fail {
                    reason: e.to_string(),
                })?;
            }
            Ok::<(), TaskError>(())
        });
        let report = BatchDriver::new(exec).run(batch, &CancellationToken::new()).await.unwrap();

        assert_eq!(report.executed(), 1);
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn success_without_output_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let exec = FnExecutor::arc("lazy", |_job: JobSpec, _ctx: ExecContext| async { Ok(()) });
        let batch = Batch::new("bcl", jobs(dir.path(), 1), BatchPolicy::default()).unwrap();

        let report = BatchDriver::new(exec).run(batch, &CancellationToken::new()).await.unwrap();
        let rec = report.record("p1").unwrap();
        assert_eq!(rec.state, JobState::Failed);
        assert_eq!(rec.outcome, Some(JobOutcome::InvalidOutput));
        assert!(rec.reason.as_deref().unwrap().contains("p1.ssv"));
    }

    #[tokio::test]
    async fn verification_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let exec = FnExecutor::arc("lazy", |_job: JobSpec, _ctx: ExecContext| async { Ok(()) });
        let policy = BatchPolicy {
            verify_outputs: false.into(),
            ..Default::default()
        };
        let batch = Batch::new("bcl", jobs(dir.path(), 1), policy).unwrap();

        let report = BatchDriver::new(exec).run(batch, &CancellationToken::new()).await.unwrap();
        assert!(report.is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_job_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let policy = BatchPolicy {
            job_timeout_ms: Some(100),
            ..Default::default()
        };
        let batch = Batch::new("bcm", jobs(dir.path(), 1), policy).unwrap();

        let t0 = Instant::now();
        let report = BatchDriver::new(writer(10_000, "")).run(batch, &CancellationToken::new()).await.unwrap();

        assert_eq!(report.record("p1").unwrap().outcome, Some(JobOutcome::Timeout));
        assert!(t0.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn panicking_executor_fails_only_its_job() {
        let dir = tempfile::tempdir().unwrap();
        let exec = FnExecutor::arc("panic", |job: JobSpec, _ctx: ExecContext| async move {
            if job.id == "p2" {
                panic!("tool wrapper bug");
            }
            fs::write(&job.output.path, b"1").map_err(|e| TaskError::Fail {
                reason: e.to_string(),
            })
        });
        let batch = Batch::new("segi", jobs(dir.path(), 3), BatchPolicy::with_concurrency(3)).unwrap();

        let report = BatchDriver::new(exec).run(batch, &CancellationToken::new()).await.unwrap();
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.failed_jobs(), ["p2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn graceful_cancel_lets_running_job_finish() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let batch = Batch::new("bcf", jobs(dir.path(), 3), BatchPolicy::default()).unwrap();
        let report = BatchDriver::new(writer(100, "")).run(batch, &cancel).await.unwrap();

        assert!(report.canceled);
        assert_eq!(report.record("p1").unwrap().state, JobState::Succeeded);
        for id in ["p2", "p3"] {
            let rec = report.record(id).unwrap();
            assert_eq!(rec.state, JobState::Failed);
            assert!(!rec.started);
            assert_eq!(rec.outcome, Some(JobOutcome::Canceled));
            assert_eq!(rec.reason.as_deref(), Some("canceled before start"));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hard_cancel_reaches_running_job() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let exec = FnExecutor::arc("obedient", |_job: JobSpec, ctx: ExecContext| async move {
            tokio::select! {
                _ = ctx.cancel().cancelled() => Err(TaskError::Canceled),
                _ = tokio::time::sleep(Duration::from_secs(10)) => Ok(()),
            }
        });
        let policy = BatchPolicy {
            cancel: CancelMode::Hard,
            ..Default::default()
        };
        let batch = Batch::new("bcf", jobs(dir.path(), 2), policy).unwrap();

        let t0 = Instant::now();
        let report = BatchDriver::new(exec).run(batch, &cancel).await.unwrap();

        assert!(t0.elapsed() < Duration::from_secs(1));
        let first = report.record("p1").unwrap();
        assert!(first.started);
        assert_eq!(first.outcome, Some(JobOutcome::Canceled));
        assert!(!report.record("p2").unwrap().started);
    }

    #[tokio::test]
    async fn unknown_named_check_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let spec = JobSpec::new(
            "p1",
            "tool",
            OutputSpec::new(dir.path().join("p1.bin"))
                .with_validity(ValidityRule::Named("model".into())),
        );
        let batch = Batch::new("bcm", vec![spec], BatchPolicy::default()).unwrap();

        let err = BatchDriver::new(writer(0, ""))
            .run(batch, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::UnknownCheck(name) if name == "model"));
    }

    #[tokio::test]
    async fn empty_batch_succeeds_immediately() {
        let batch = Batch::new("seg", Vec::new(), BatchPolicy::default()).unwrap();
        let report = BatchDriver::new(writer(0, "")).run(batch, &CancellationToken::new()).await.unwrap();
        assert_eq!(report.total(), 0);
        assert!(report.is_success());
        assert!(!report.fully_skipped());
    }
}
