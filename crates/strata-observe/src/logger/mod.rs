mod clock;
mod config;
mod error;
mod format;
mod init;
mod level;

pub use clock::{LogClock, LoggerTimeZone, init_local_offset};
pub use config::LoggerConfig;
pub use error::{LoggerError, LoggerResult};
pub use format::LoggerFormat;
pub use level::LoggerLevel;

/// Install the global tracing subscriber described by `cfg`.
///
/// Fails if a global subscriber is already set. For `LoggerTimeZone::Local`
/// call [`init_local_offset`] from `main` before the tokio runtime starts.
pub fn init_logger(cfg: &LoggerConfig) -> LoggerResult<()> {
    match cfg.format {
        LoggerFormat::Text => init::text(cfg),
        LoggerFormat::Json => init::json(cfg),
        LoggerFormat::Journald => init::journald(cfg),
    }
}
