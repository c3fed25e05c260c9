use std::fmt;

use tokio_util::sync::CancellationToken;

/// Per-job context passed from the driver to the executor.
#[derive(Clone)]
pub struct ExecContext {
    run_id: String,
    stage: String,
    threads: usize,
    cancel: CancellationToken,
}

impl ExecContext {
    pub fn new(
        run_id: impl Into<String>,
        stage: impl Into<String>,
        threads: usize,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            stage: stage.into(),
            threads,
            cancel,
        }
    }

    /// End-to-end log identifier of this execution.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    /// Thread budget the external process may use.
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Fires when the job must stop (hard cancellation or per-job timeout).
    pub fn cancel(&self) -> &CancellationToken {
        &self.cancel
    }
}

impl fmt::Debug for ExecContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecContext")
            .field("run_id", &self.run_id)
            .field("stage", &self.stage)
            .field("threads", &self.threads)
            .field("canceled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl fmt::Display for ExecContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ExecContext(run={}, threads={})", self.run_id, self.threads)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_return_constructor_values() {
        let ctx = ExecContext::new("segii-p1-1", "segii", 4, CancellationToken::new());
        assert_eq!(ctx.run_id(), "segii-p1-1");
        assert_eq!(ctx.stage(), "segii");
        assert_eq!(ctx.threads(), 4);
        assert!(!ctx.cancel().is_cancelled());
    }

    #[test]
    fn display_is_compact() {
        let ctx = ExecContext::new("bcf-p2-a", "bcf", 1, CancellationToken::new());
        assert_eq!(ctx.to_string(), "ExecContext(run=bcf-p2-a, threads=1)");
    }
}
