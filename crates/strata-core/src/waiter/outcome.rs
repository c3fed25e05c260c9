use std::time::Duration;

use strata_model::LayerStatus;

/// How a wait ended. Callers must branch on it; only `Reached` means the layer
/// is safe to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    Reached {
        status: LayerStatus,
        elapsed: Duration,
    },
    /// Deadline passed; `last` is the last status observed, if any.
    TimedOut {
        last: Option<LayerStatus>,
        elapsed: Duration,
    },
    /// Layer entered `error` while a different status was awaited.
    Failed { elapsed: Duration },
    Canceled { elapsed: Duration },
}

impl WaitOutcome {
    pub fn is_reached(&self) -> bool {
        matches!(self, WaitOutcome::Reached { .. })
    }

    pub fn elapsed(&self) -> Duration {
        match *self {
            WaitOutcome::Reached { elapsed, .. }
            | WaitOutcome::TimedOut { elapsed, .. }
            | WaitOutcome::Failed { elapsed }
            | WaitOutcome::Canceled { elapsed } => elapsed,
        }
    }

    /// Short label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            WaitOutcome::Reached { .. } => "reached",
            WaitOutcome::TimedOut { .. } => "timed_out",
            WaitOutcome::Failed { .. } => "failed",
            WaitOutcome::Canceled { .. } => "canceled",
        }
    }
}
