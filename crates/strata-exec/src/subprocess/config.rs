use serde::{Deserialize, Serialize};
use strata_model::Env;

use crate::{ExecError, threads::DEFAULT_THREAD_VARS};

/// Configuration for subprocess output logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LogConfig {
    /// Max line length before truncation.
    pub max_line_length: usize,
    /// Log stdout at INFO level (false = DEBUG).
    pub stdout_info: bool,
    /// Log stderr at WARN level (false = DEBUG).
    pub stderr_warn: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            max_line_length: 4096,
            stdout_info: false,
            stderr_warn: true,
        }
    }
}

/// Settings shared by every process a [`crate::SubprocessExecutor`] spawns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExecConfig {
    /// Applied before the job's own environment, which wins on conflicts.
    pub env: Env,
    /// Variables set to the job's thread budget.
    pub thread_vars: Vec<String>,
    pub log: LogConfig,
}

impl Default for ExecConfig {
    fn default() -> Self {
        Self {
            env: Env::new(),
            thread_vars: DEFAULT_THREAD_VARS.iter().map(|v| v.to_string()).collect(),
            log: LogConfig::default(),
        }
    }
}

impl ExecConfig {
    pub fn validate(&self) -> Result<(), ExecError> {
        if self.log.max_line_length == 0 {
            return Err(ExecError::InvalidConfig(
                "log.maxLineLength cannot be zero".into(),
            ));
        }
        if let Some(bad) = self.thread_vars.iter().find(|v| v.trim().is_empty() || v.contains('=')) {
            return Err(ExecError::InvalidConfig(format!(
                "invalid thread variable name '{bad}'"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cap_both_thread_vars() {
        let cfg = ExecConfig::default();
        assert_eq!(cfg.thread_vars, ["OMP_NUM_THREADS", "ITK_GLOBAL_DEFAULT_NUMBER_OF_THREADS"]);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn bad_values_are_rejected() {
        let mut cfg = ExecConfig::default();
        cfg.log.max_line_length = 0;
        assert!(cfg.validate().is_err());

        let cfg = ExecConfig {
            thread_vars: vec!["A=B".into()],
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: ExecConfig = serde_json::from_str(r#"{"log": {"stdoutInfo": true}}"#).unwrap();
        assert!(cfg.log.stdout_info);
        assert_eq!(cfg.log.max_line_length, 4096);
        assert_eq!(cfg.thread_vars.len(), 2);
    }
}
