//! Runs a [`strata_model::JobSpec`] as an OS process via `tokio::process`.
mod config;
pub use config::{ExecConfig, LogConfig};

mod output;

mod executor;
pub use executor::SubprocessExecutor;
