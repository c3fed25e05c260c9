use std::{future::Future, sync::Arc};

use async_trait::async_trait;
use strata_model::JobSpec;
use taskvisor::TaskError;

use crate::executor::{ExecContext, JobExecutor};

/// Executor backed by an async closure.
///
/// Useful for in-process jobs and for tests that simulate external tools.
pub struct FnExecutor<F> {
    name: &'static str,
    f: F,
}

impl<F, Fut> FnExecutor<F>
where
    F: Fn(JobSpec, ExecContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }

    /// Build the executor behind an `Arc`, ready for [`crate::BatchDriver::new`].
    pub fn arc(name: &'static str, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> JobExecutor for FnExecutor<F>
where
    F: Fn(JobSpec, ExecContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    async fn execute(&self, job: &JobSpec, ctx: &ExecContext) -> Result<(), TaskError> {
        (self.f)(job.clone(), ctx.clone()).await
    }
}
