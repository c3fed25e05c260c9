//! Job executor abstraction.
//!
//! The driver never spawns processes itself: it hands each admitted
//! [`JobSpec`] to a [`JobExecutor`] supplied by the environment.
mod context;
pub use context::ExecContext;

mod func;
pub use func::FnExecutor;

mod id;
pub use id::make_run_id;

use async_trait::async_trait;
use strata_model::JobSpec;
use taskvisor::TaskError;

/// Runs one job to completion.
///
/// Implementations are shared by every worker of a batch and must be safe to
/// call concurrently. A job succeeds with `Ok(())`; any `Err` marks it failed
/// without affecting its siblings.
///
/// `TaskError::Canceled` should be returned when `ctx.cancel` fired, so the
/// driver can tell cancellation apart from a tool failure.
#[async_trait]
pub trait JobExecutor: Send + Sync {
    /// Executor name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    async fn execute(&self, job: &JobSpec, ctx: &ExecContext) -> Result<(), TaskError>;
}
