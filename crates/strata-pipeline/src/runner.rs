use std::{fmt, fs, time::Duration};

use strata_core::{BatchDriver, BatchReport};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    config::PipelineConfig,
    discovery::Discovered,
    error::{PipelineError, PipelineResult},
    stages::{Stage, StagePlan},
};

/// Runs the classifier pipeline stage by stage on one [`BatchDriver`].
pub struct PipelineRunner {
    config: PipelineConfig,
    driver: BatchDriver,
}

impl PipelineRunner {
    pub fn new(config: PipelineConfig, driver: BatchDriver) -> Self {
        Self { config, driver }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Validate, discover inputs, then run every enabled stage (or the `only`
    /// subset) in order. A stage starts only after the previous one returned.
    ///
    /// Configuration and discovery problems fail before any job runs. Job
    /// failures land in the report; with `halt_on_failure` the run stops after
    /// the first stage that had any.
    pub async fn run(
        &self,
        only: Option<&[Stage]>,
        cancel: &CancellationToken,
    ) -> PipelineResult<RunReport> {
        self.config.validate()?;
        let started = Instant::now();

        let stages = Stage::ordered(&self.config, only);
        let blur_runs = stages.contains(&Stage::Blur);
        let mut discovered = Discovered::scan(&self.config.inputs, !blur_runs)?;
        let plan = StagePlan::new(&self.config, &discovered);

        let mut report = RunReport::default();
        for stage in stages {
            if cancel.is_cancelled() {
                report.canceled = true;
                break;
            }
            for dir in plan.output_dirs(stage) {
                fs::create_dir_all(&dir).map_err(|e| PipelineError::io(&dir, e))?;
            }

            let batch = plan.batch(stage)?;
            info!(stage = %stage, jobs = batch.len(), "stage starting");
            let batch_report = self.driver.run(batch, cancel).await?;
            let ok = batch_report.is_success();
            if batch_report.fully_skipped() {
                info!(stage = %stage, "stage fully skipped, outputs already valid");
            }
            report.canceled = batch_report.canceled;
            report.stages.push(batch_report);

            if report.canceled {
                warn!(stage = %stage, "run canceled");
                break;
            }
            if !ok && self.config.halt_on_failure {
                warn!(stage = %stage, "stage had failures, later stages halted");
                report.halted_after = Some(stage);
                break;
            }
            if stage == Stage::Blur && ok {
                discovered.check_blurred(&self.config.inputs)?;
            }
        }

        report.elapsed = started.elapsed();
        info!(
            stages = report.stages.len(),
            failed = report.failed_jobs().len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "pipeline finished"
        );
        Ok(report)
    }
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Reports of the stages that ran, in order.
    pub stages: Vec<BatchReport>,
    /// Stage after which the run stopped because of failed jobs.
    pub halted_after: Option<Stage>,
    pub canceled: bool,
    pub elapsed: Duration,
}

impl RunReport {
    /// No job failed in any stage and the run was not canceled.
    pub fn is_success(&self) -> bool {
        !self.canceled && self.stages.iter().all(BatchReport::is_success)
    }

    /// `(stage, job id)` of every failed job.
    pub fn failed_jobs(&self) -> Vec<(&str, &str)> {
        self.stages
            .iter()
            .flat_map(|s| s.failed_jobs().into_iter().map(move |j| (s.stage.as_str(), j)))
            .collect()
    }

    pub fn stage(&self, stage: Stage) -> Option<&BatchReport> {
        self.stages.iter().find(|s| s.stage == stage.name())
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stage in &self.stages {
            writeln!(f, "{stage}")?;
        }
        if let Some(stage) = self.halted_after {
            writeln!(f, "halted after stage {stage}")?;
        }
        if self.canceled {
            writeln!(f, "run canceled")?;
        }
        write!(f, "elapsed {:.1}s", self.elapsed.as_secs_f64())
    }
}
