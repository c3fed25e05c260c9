//! Completion waiter.
//!
//! Blocks a HOST flow until a layer reaches a target status or a deadline
//! passes. The layer is never owned here: its state key (`<id>::data`) is
//! polled through a [`StatusSource`], and an optional [`Notify`] lets an event
//! feed wake the waiter before the next poll.
mod error;
pub use error::WaitError;

mod outcome;
pub use outcome::WaitOutcome;

use std::{str::FromStr, sync::Arc, time::Duration};

use async_trait::async_trait;
use strata_model::{LayerId, LayerStatus};
use tokio::{
    sync::Notify,
    task::JoinHandle,
    time::{Instant, sleep_until, timeout_at},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Default interval between two status reads.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Read access to HOST state values.
///
/// Must tolerate being called repeatedly and rapidly.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Current value stored under `key`, or `None` if the key does not exist yet.
    async fn read_state(&self, key: &str) -> Result<Option<String>, WaitError>;
}

/// Polls layer state until a target status is observed.
#[derive(Clone)]
pub struct Waiter {
    source: Arc<dyn StatusSource>,
    poll_interval: Duration,
    notify: Arc<Notify>,
}

impl Waiter {
    pub fn new(source: Arc<dyn StatusSource>) -> Self {
        Self {
            source,
            poll_interval: DEFAULT_POLL_INTERVAL,
            notify: Arc::new(Notify::new()),
        }
    }

    /// Upper bound on one wait cycle. Zero is replaced by the default.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = if interval.is_zero() {
            DEFAULT_POLL_INTERVAL
        } else {
            interval
        };
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Handle to wake pending waits early; call `notify_one` on state change.
    pub fn notifier(&self) -> Arc<Notify> {
        Arc::clone(&self.notify)
    }

    /// Wait until `layer` reports `target`, `timeout` elapses, or `cancel` fires.
    ///
    /// The polling loop runs on its own task; dropping the returned future
    /// aborts it.
    pub async fn wait_for(
        &self,
        layer: &LayerId,
        target: LayerStatus,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<WaitOutcome, WaitError> {
        if timeout.is_zero() {
            return Err(WaitError::InvalidTimeout);
        }

        let poll = Poll {
            source: Arc::clone(&self.source),
            notify: Arc::clone(&self.notify),
            key: layer.state_key(),
            target,
            interval: self.poll_interval,
            cancel: cancel.clone(),
        };
        debug!(layer = %layer, target = target.as_str(), timeout_ms = timeout.as_millis() as u64, "waiting on layer");

        let mut task = AbortOnDrop(tokio::spawn(poll.run(timeout)));
        let outcome = match (&mut task.0).await {
            Ok(res) => res?,
            Err(e) => return Err(WaitError::Join(e.to_string())),
        };

        match outcome {
            WaitOutcome::Reached { elapsed, .. } => {
                debug!(layer = %layer, ms = elapsed.as_millis() as u64, "layer reached target")
            }
            WaitOutcome::TimedOut { last, elapsed } => warn!(
                layer = %layer,
                target = target.as_str(),
                last = last.map(|s| s.as_str()),
                ms = elapsed.as_millis() as u64,
                "timed out waiting on layer"
            ),
            WaitOutcome::Failed { .. } => warn!(layer = %layer, "layer entered error state"),
            WaitOutcome::Canceled { .. } => debug!(layer = %layer, "wait canceled"),
        }
        Ok(outcome)
    }

    /// Shorthand for waiting on [`LayerStatus::Available`].
    pub async fn wait_available(
        &self,
        layer: &LayerId,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<WaitOutcome, WaitError> {
        self.wait_for(layer, LayerStatus::Available, timeout, cancel)
            .await
    }

    /// Blocking variant for synchronous callers outside the runtime.
    ///
    /// Panics if called from within an async context, like `Handle::block_on`.
    pub fn wait_blocking(
        &self,
        runtime: &tokio::runtime::Handle,
        layer: &LayerId,
        target: LayerStatus,
        timeout: Duration,
    ) -> Result<WaitOutcome, WaitError> {
        let cancel = CancellationToken::new();
        runtime.block_on(self.wait_for(layer, target, timeout, &cancel))
    }
}

struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

struct Poll {
    source: Arc<dyn StatusSource>,
    notify: Arc<Notify>,
    key: String,
    target: LayerStatus,
    interval: Duration,
    cancel: CancellationToken,
}

impl Poll {
    async fn run(self, timeout: Duration) -> Result<WaitOutcome, WaitError> {
        let start = Instant::now();
        let deadline = start + timeout;
        let mut last = None;

        loop {
            let read = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return Ok(WaitOutcome::Canceled { elapsed: start.elapsed() });
                }
                read = timeout_at(deadline, self.read()) => read,
            };
            // A stalled read still ends the wait at the deadline.
            let Ok(read) = read else {
                return Ok(WaitOutcome::TimedOut {
                    last,
                    elapsed: start.elapsed(),
                });
            };
            if let Some(status) = read? {
                if status == self.target {
                    return Ok(WaitOutcome::Reached {
                        status,
                        elapsed: start.elapsed(),
                    });
                }
                if status == LayerStatus::Error {
                    return Ok(WaitOutcome::Failed {
                        elapsed: start.elapsed(),
                    });
                }
                last = Some(status);
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(WaitOutcome::TimedOut {
                    last,
                    elapsed: now - start,
                });
            }

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    return Ok(WaitOutcome::Canceled { elapsed: start.elapsed() });
                }
                _ = self.notify.notified() => {}
                _ = sleep_until((now + self.interval).min(deadline)) => {}
            }
        }
    }

    async fn read(&self) -> Result<Option<LayerStatus>, WaitError> {
        let Some(raw) = self.source.read_state(&self.key).await? else {
            return Ok(None);
        };
        match LayerStatus::from_str(raw.trim()) {
            Ok(status) => Ok(Some(status)),
            Err(_) => {
                trace!(key = %self.key, value = %raw, "unrecognized layer status ignored");
                Ok(None)
            }
        }
    }
}
