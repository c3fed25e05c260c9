//! Batch event logging.
//!
//! Maps driver lifecycle events to structured tracing logs with a severity
//! per event kind.
use strata_core::{BatchEvent, BatchEventKind, Subscribe};
use tracing::{debug, error, info, trace, warn};

/// Subscriber that logs every [`BatchEvent`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSubscriber;

impl Subscribe for LogSubscriber {
    fn on_event(&self, event: &BatchEvent) {
        log_event(event);
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

fn log_event(e: &BatchEvent) {
    let msg = message_for(e.kind);
    let stage = &*e.stage;
    let job = e.job.as_deref().unwrap_or("-");
    let reason = e.reason.as_deref().unwrap_or("unknown");
    let ms = e.duration_ms.unwrap_or(0);

    match e.kind {
        BatchEventKind::BatchStarted => info!(stage, jobs = e.count.unwrap_or(0), "{msg}"),
        BatchEventKind::BatchCompleted => info!(stage, failed = e.count.unwrap_or(0), ms, "{msg}"),
        BatchEventKind::BatchCanceled => warn!(stage, failed = e.count.unwrap_or(0), ms, "{msg}"),

        BatchEventKind::JobSkipped => trace!(stage, job, "{msg}"),
        BatchEventKind::JobStarted => debug!(stage, job, "{msg}"),
        BatchEventKind::JobSucceeded => debug!(stage, job, ms, "{msg}"),

        BatchEventKind::JobFailed => error!(stage, job, reason, ms, "{msg}"),
        BatchEventKind::JobTimedOut => warn!(stage, job, ms, "{msg}"),
        BatchEventKind::JobCanceled => warn!(stage, job, reason, "{msg}"),
    }
}

#[inline]
fn message_for(kind: BatchEventKind) -> &'static str {
    match kind {
        BatchEventKind::BatchStarted => "batch started",
        BatchEventKind::BatchCompleted => "batch completed",
        BatchEventKind::BatchCanceled => "batch canceled before every job ran",
        BatchEventKind::JobSkipped => "job skipped, outputs already valid",
        BatchEventKind::JobStarted => "job started",
        BatchEventKind::JobSucceeded => "job succeeded",
        BatchEventKind::JobFailed => "job failed",
        BatchEventKind::JobTimedOut => "job exceeded its timeout",
        BatchEventKind::JobCanceled => "job canceled",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{sync::Arc, time::Duration};

    const ALL: [BatchEventKind; 9] = [
        BatchEventKind::BatchStarted,
        BatchEventKind::BatchCompleted,
        BatchEventKind::BatchCanceled,
        BatchEventKind::JobSkipped,
        BatchEventKind::JobStarted,
        BatchEventKind::JobSucceeded,
        BatchEventKind::JobFailed,
        BatchEventKind::JobTimedOut,
        BatchEventKind::JobCanceled,
    ];

    #[test]
    fn messages_are_distinct() {
        let mut msgs: Vec<_> = ALL.iter().map(|k| message_for(*k)).collect();
        msgs.sort_unstable();
        msgs.dedup();
        assert_eq!(msgs.len(), ALL.len());
    }

    #[test]
    fn logging_any_event_does_not_panic() {
        let stage: Arc<str> = Arc::from("bcf");
        for kind in ALL {
            LogSubscriber.on_event(&BatchEvent::batch(kind, &stage));
            LogSubscriber.on_event(
                &BatchEvent::job(kind, &stage, "p1")
                    .with_reason("exit code 1")
                    .with_duration(Duration::from_millis(12)),
            );
        }
        assert_eq!(LogSubscriber.name(), "log");
    }
}
