pub mod check;
pub mod driver;
pub mod error;
pub mod events;
pub mod executor;
pub mod metrics;
pub mod waiter;

pub use check::{CheckRegistry, OutputCheck};
pub use driver::{Batch, BatchDriver, BatchReport, JobRecord, JobState};
pub use error::CoreError;
pub use events::{BatchEvent, BatchEventKind, Subscribe};
pub use executor::{ExecContext, FnExecutor, JobExecutor, make_run_id};
pub use metrics::{JobOutcome, MetricsBackend, MetricsHandle, NoOpMetrics, noop_metrics};
pub use waiter::{StatusSource, WaitError, WaitOutcome, Waiter};

pub mod prelude {
    pub use crate::driver::{Batch, BatchDriver, BatchReport};
    pub use crate::error::CoreError;
    pub use crate::executor::{ExecContext, JobExecutor};
    pub use crate::waiter::{StatusSource, WaitOutcome, Waiter};
}
