use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Behaviour of a running batch when its cancellation token fires.
///
/// In both modes no further job is admitted from the pending queue and the
/// jobs that never started are reported as failed with reason `canceled`.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CancelMode {
    /// Jobs already running are left to finish.
    #[default]
    Graceful,
    /// Jobs already running are told to stop; subprocesses are killed.
    Hard,
}

impl fmt::Display for CancelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CancelMode::Graceful => "graceful",
            CancelMode::Hard => "hard",
        })
    }
}

impl FromStr for CancelMode {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "graceful" | "drain" => Ok(CancelMode::Graceful),
            "hard" | "kill" => Ok(CancelMode::Hard),
            other => Err(ModelError::UnknownCancelMode(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::CancelMode;

    #[test]
    fn parses_aliases() {
        assert_eq!("drain".parse::<CancelMode>().unwrap(), CancelMode::Graceful);
        assert_eq!("KILL".parse::<CancelMode>().unwrap(), CancelMode::Hard);
        assert!("soft".parse::<CancelMode>().is_err());
    }
}
