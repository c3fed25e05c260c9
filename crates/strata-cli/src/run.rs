use std::{fs, path::Path, process::ExitCode, sync::Arc};

use anyhow::Context;
use strata_core::{BatchDriver, Subscribe};
use strata_exec::SubprocessExecutor;
use strata_observe::{LogSubscriber, init_logger};
use strata_pipeline::{Discovered, PipelineConfig, PipelineRunner, RunReport, Stage, StagePlan};
use strata_prometheus::PrometheusMetrics;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::RunArgs;

/// At least one job failed, or the run was canceled.
const EXIT_JOBS_FAILED: u8 = 1;
/// Configuration, discovery or setup error; no report was produced.
const EXIT_ERROR: u8 = 2;

pub fn error_exit() -> ExitCode {
    ExitCode::from(EXIT_ERROR)
}

/// Load the config and apply command line overrides on top of it.
fn load(args: &RunArgs) -> anyhow::Result<PipelineConfig> {
    let mut cfg = PipelineConfig::load(&args.config)?;
    if args.resume {
        cfg.policy = cfg.policy.resume(true);
    }
    if args.keep_going {
        cfg.halt_on_failure = false;
    }
    if let Some(n) = args.max_parallel {
        cfg.policy.max_concurrency = n;
    }
    if let Some(n) = args.threads {
        cfg.policy.threads_per_job = n;
    }
    if let Some(level) = &args.log_level {
        cfg.logger.level = level.clone();
    }
    if let Some(format) = args.log_format {
        cfg.logger.format = format;
    }
    cfg.validate()?;
    Ok(cfg)
}

pub async fn run(args: RunArgs) -> anyhow::Result<ExitCode> {
    let cfg = load(&args)?;
    init_logger(&cfg.logger)?;
    info!(config = %args.config.display(), "configuration loaded");

    let metrics = Arc::new(PrometheusMetrics::new().context("metrics registry")?);
    let executor = Arc::new(SubprocessExecutor::with_config(cfg.exec.clone())?);
    let subscribers: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogSubscriber)];
    let driver = BatchDriver::new(executor)
        .with_metrics(metrics.clone())
        .with_subscribers(subscribers);

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, canceling run");
            on_signal.cancel();
        }
    });

    let only = (!args.only.is_empty()).then_some(args.only.as_slice());
    let runner = PipelineRunner::new(cfg, driver);
    let report = runner.run(only, &cancel).await?;

    if let Some(path) = &args.metrics_out {
        write_metrics(&metrics, path)?;
    }
    Ok(summarize(&report))
}

fn write_metrics(metrics: &PrometheusMetrics, path: &Path) -> anyhow::Result<()> {
    let text = metrics.encode_text().context("encode metrics")?;
    fs::write(path, text).with_context(|| format!("write metrics to {}", path.display()))
}

/// Print the report and map it to an exit code. Failed jobs go to stderr.
fn summarize(report: &RunReport) -> ExitCode {
    println!("{report}");
    if report.is_success() {
        return ExitCode::SUCCESS;
    }
    let failed = report.failed_jobs();
    if !failed.is_empty() {
        eprintln!("failed jobs:");
        for (stage, job) in failed {
            eprintln!("  {stage}: {job}");
        }
    }
    ExitCode::from(EXIT_JOBS_FAILED)
}

pub fn check(path: &Path) -> anyhow::Result<ExitCode> {
    let cfg = PipelineConfig::load(path)?;
    cfg.validate()?;
    let stages = Stage::ordered(&cfg, None);
    let discovered = Discovered::scan(&cfg.inputs, !stages.contains(&Stage::Blur))?;
    let plan = StagePlan::new(&cfg, &discovered);

    println!(
        "items: {} training, {} test",
        discovered.items.training().len(),
        discovered.items.test().len()
    );
    for stage in stages {
        let batch = plan.batch(stage)?;
        println!(
            "{:<10} {:>5} jobs  parallel {}",
            stage.name(),
            batch.len(),
            batch.policy().max_concurrency
        );
    }
    Ok(ExitCode::SUCCESS)
}

pub fn stages() {
    for stage in Stage::ALL {
        println!("{stage}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use crate::cli::{Cli, Command};

    fn write_config(root: &Path) -> std::path::PathBuf {
        for d in ["gray", "gray_test", "gray_all", "chm", "chm-blur", "truth", "bin"] {
            fs::create_dir_all(root.join(d)).unwrap();
        }
        let cfg = format!(
            r#"{{
                "inputs": {{
                    "grayTraining": "{r}/gray", "grayTest": "{r}/gray_test",
                    "grayAll": "{r}/gray_all", "boundary": "{r}/chm",
                    "blurred": "{r}/chm-blur", "truth": "{r}/truth"
                }},
                "binDir": "{r}/bin",
                "resultsDir": "{r}/res",
                "policy": {{ "maxConcurrency": 70 }}
            }}"#,
            r = root.display()
        );
        let path = root.join("cfg.json");
        fs::write(&path, cfg).unwrap();
        path
    }

    fn run_args(argv: &[&str]) -> RunArgs {
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Run(args) => args,
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn flags_override_config() {
        let root = tempfile::tempdir().unwrap();
        let path = write_config(root.path());
        let path = path.to_str().unwrap();

        let cfg = load(&run_args(&["strata", "run", "-c", path])).unwrap();
        assert!(cfg.policy.resume.is_disabled());
        assert!(cfg.halt_on_failure);
        assert_eq!(cfg.policy.max_concurrency, 70);

        let cfg = load(&run_args(&[
            "strata",
            "run",
            "-c",
            path,
            "--resume",
            "--keep-going",
            "--max-parallel",
            "3",
            "--log-level",
            "debug",
        ]))
        .unwrap();
        assert!(cfg.policy.resume.is_enabled());
        assert!(!cfg.halt_on_failure);
        assert_eq!(cfg.policy.max_concurrency, 3);
        assert_eq!(cfg.logger.level.as_str(), "debug");
    }

    #[test]
    fn zero_parallelism_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        let path = write_config(root.path());
        let args = run_args(&["strata", "run", "-c", path.to_str().unwrap(), "--max-parallel", "0"]);
        assert!(load(&args).is_err());
    }

    #[test]
    fn check_fails_on_empty_inputs() {
        let root = tempfile::tempdir().unwrap();
        let path = write_config(root.path());
        let err = check(&path).unwrap_err();
        assert!(err.to_string().contains("discovery"), "{err}");
    }

    #[test]
    fn check_reports_plan_for_populated_inputs() {
        let root = tempfile::tempdir().unwrap();
        let path = write_config(root.path());
        for (dir, file) in [
            ("gray", "p1.mha"),
            ("gray_test", "t1.mha"),
            ("chm", "p1.mha"),
            ("chm", "t1.mha"),
            ("chm-blur", "p1.mha"),
            ("chm-blur", "t1.mha"),
            ("truth", "p1.png"),
        ] {
            fs::write(root.path().join(dir).join(file), b"x").unwrap();
        }
        assert!(check(&path).is_ok());
    }
}
