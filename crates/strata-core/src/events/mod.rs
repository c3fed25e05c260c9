//! Batch lifecycle events and the subscriber interface that consumes them.
//!
//! The driver publishes one event per state change. Subscribers run inline on
//! the worker that produced the event, so they must be cheap and non-blocking.
use std::{sync::Arc, time::Duration};

/// Kind of lifecycle change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchEventKind {
    /// Batch handed to the driver; `count` is the number of jobs.
    BatchStarted,
    /// Every job reached a terminal state.
    BatchCompleted,
    /// Cancellation was observed before every job was admitted.
    BatchCanceled,
    /// Job dropped by the resume pre-filter.
    JobSkipped,
    /// Job admitted to a worker.
    JobStarted,
    JobSucceeded,
    /// Executor failure or invalid output; `reason` says which.
    JobFailed,
    JobTimedOut,
    JobCanceled,
}

/// Single lifecycle event.
#[derive(Debug, Clone)]
pub struct BatchEvent {
    pub kind: BatchEventKind,
    pub stage: Arc<str>,
    pub job: Option<Arc<str>>,
    pub reason: Option<String>,
    pub duration_ms: Option<u64>,
    pub count: Option<usize>,
}

impl BatchEvent {
    /// Event about the batch as a whole.
    pub fn batch(kind: BatchEventKind, stage: &Arc<str>) -> Self {
        Self {
            kind,
            stage: Arc::clone(stage),
            job: None,
            reason: None,
            duration_ms: None,
            count: None,
        }
    }

    /// Event about one job of the batch.
    pub fn job(kind: BatchEventKind, stage: &Arc<str>, job: &str) -> Self {
        Self {
            job: Some(Arc::from(job)),
            ..Self::batch(kind, stage)
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = Some(duration.as_millis() as u64);
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }
}

/// Consumer of [`BatchEvent`]s.
pub trait Subscribe: Send + Sync + 'static {
    fn on_event(&self, event: &BatchEvent);

    /// Subscriber name used in diagnostics.
    fn name(&self) -> &'static str;
}

/// Fan-out list of subscribers shared by all workers of a driver.
#[derive(Clone)]
pub(crate) struct Subscribers(Arc<[Arc<dyn Subscribe>]>);

impl Default for Subscribers {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Subscribers {
    pub(crate) fn new(list: Vec<Arc<dyn Subscribe>>) -> Self {
        Self(list.into())
    }

    pub(crate) fn emit(&self, event: BatchEvent) {
        for sub in self.0.iter() {
            sub.on_event(&event);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}
