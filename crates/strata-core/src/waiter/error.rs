use thiserror::Error;

/// Errors that stop a wait before any outcome is known.
#[derive(Debug, Error)]
pub enum WaitError {
    #[error("wait timeout must be positive")]
    InvalidTimeout,

    #[error("status source failed: {0}")]
    Source(String),

    #[error("waiter task failed: {0}")]
    Join(String),
}
