use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use strata_core::{ExecContext, JobExecutor};
use strata_model::JobSpec;
use taskvisor::TaskError;
use tokio::process::Command;
use tracing::{debug, trace};

use crate::{
    ExecError,
    subprocess::{
        ExecConfig,
        output::{Stream, pump},
    },
    threads::thread_env,
};

/// Executor that runs each job as a child process.
///
/// The child inherits a merged environment (executor env, then thread caps,
/// then the job's own env) and has its output forwarded to the log line by
/// line. Non-zero exit is a job failure. When the context token fires the
/// child is killed and the job reports [`TaskError::Canceled`].
pub struct SubprocessExecutor {
    name: &'static str,
    config: ExecConfig,
}

impl Default for SubprocessExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl SubprocessExecutor {
    pub fn new() -> Self {
        Self {
            name: "subprocess",
            config: ExecConfig::default(),
        }
    }

    /// Create an executor with explicit configuration.
    pub fn with_config(config: ExecConfig) -> Result<Self, ExecError> {
        config.validate()?;
        Ok(Self {
            name: "subprocess",
            config,
        })
    }

    pub fn config(&self) -> &ExecConfig {
        &self.config
    }

    fn command(&self, job: &JobSpec, ctx: &ExecContext) -> Result<Command, ExecError> {
        job.validate().map_err(|e| ExecError::InvalidSpec(e.to_string()))?;

        let env = self
            .config
            .env
            .merged(&thread_env(ctx.threads(), &self.config.thread_vars))
            .merged(&job.env);

        let mut cmd = Command::new(&job.program);
        cmd.args(&job.args);
        if let Some(cwd) = &job.cwd {
            cmd.current_dir(cwd);
        }
        for kv in env.iter() {
            cmd.env(kv.key(), kv.value());
        }
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        cmd.kill_on_drop(true);
        Ok(cmd)
    }
}

#[async_trait]
impl JobExecutor for SubprocessExecutor {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn execute(&self, job: &JobSpec, ctx: &ExecContext) -> Result<(), TaskError> {
        let mut cmd = self.command(job, ctx).map_err(|e| TaskError::Fatal {
            reason: e.to_string(),
        })?;
        trace!(run = ctx.run_id(), cmd = ?job.command_line(), cwd = ?job.cwd, "spawning subprocess");

        let mut child = cmd.spawn().map_err(|e| TaskError::Fatal {
            reason: format!("spawn {} failed: {e}", job.program.display()),
        })?;

        let log = self.config.log;
        let mut pumps = Vec::with_capacity(2);
        if let Some(out) = child.stdout.take() {
            pumps.push(tokio::spawn(pump(out, Stream::Stdout, ctx.run_id().to_string(), log)));
        }
        if let Some(err) = child.stderr.take() {
            pumps.push(tokio::spawn(pump(err, Stream::Stderr, ctx.run_id().to_string(), log)));
        }

        let result = tokio::select! {
            res = child.wait() => {
                let status = res.map_err(|e| TaskError::Fatal {
                    reason: format!("wait failed: {e}"),
                })?;
                exit_result(status)
            }
            _ = ctx.cancel().cancelled() => {
                debug!(run = ctx.run_id(), "cancellation requested; killing subprocess");
                if let Err(e) = child.kill().await {
                    debug!(run = ctx.run_id(), "failed to kill subprocess: {e}");
                }
                Err(TaskError::Canceled)
            }
        };

        for handle in pumps {
            let _ = handle.await;
        }
        if result.is_ok() {
            debug!(run = ctx.run_id(), "subprocess exited successfully");
        }
        result
    }
}

fn exit_result(status: ExitStatus) -> Result<(), TaskError> {
    if status.success() {
        return Ok(());
    }
    if let Some(code) = status.code() {
        return Err(TaskError::Fail {
            reason: format!("process exited with non-zero code: {code}"),
        });
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return Err(TaskError::Fail {
                reason: format!("process terminated by signal {signal}"),
            });
        }
    }
    Err(TaskError::Fail {
        reason: "process terminated by signal".into(),
    })
}
