mod error;
pub use error::ExecError;

mod threads;
pub use threads::{DEFAULT_THREAD_VARS, thread_env};

#[cfg(feature = "subprocess")]
pub mod subprocess;
#[cfg(feature = "subprocess")]
pub use subprocess::{ExecConfig, LogConfig, SubprocessExecutor};
