use std::io::IsTerminal;

use serde::{Deserialize, Serialize};

use crate::logger::{LoggerFormat, LoggerLevel, LoggerTimeZone};

/// Logger configuration, usually the `logger` section of the pipeline config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` expression.
    pub level: LoggerLevel,
    pub tz: LoggerTimeZone,
    /// Include module targets in text and json output.
    pub with_targets: bool,
    /// Color text output; ignored when stdout is not a terminal.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            tz: LoggerTimeZone::default(),
            with_targets: false,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    pub fn with_level(mut self, level: LoggerLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_format(mut self, format: LoggerFormat) -> Self {
        self.format = format;
        self
    }

    /// Color only when requested and stdout is a terminal.
    pub fn should_use_color(&self) -> bool {
        self.use_color && std::io::stdout().is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_gives_defaults() {
        let cfg: LoggerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, LoggerConfig::default());
        assert_eq!(cfg.level.as_str(), "info");
        assert_eq!(cfg.format, LoggerFormat::Text);
    }

    #[test]
    fn camel_case_fields_are_read() {
        let cfg: LoggerConfig =
            serde_json::from_str(r#"{"format": "json", "level": "debug", "withTargets": true, "tz": "local"}"#)
                .unwrap();
        assert_eq!(cfg.format, LoggerFormat::Json);
        assert_eq!(cfg.level.as_str(), "debug");
        assert!(cfg.with_targets);
        assert_eq!(cfg.tz, LoggerTimeZone::Local);
    }

    #[test]
    fn overrides_replace_single_fields() {
        let cfg = LoggerConfig::default()
            .with_level("warn".parse().unwrap())
            .with_format(LoggerFormat::Json);
        assert_eq!(cfg.level.as_str(), "warn");
        assert_eq!(cfg.format, LoggerFormat::Json);
        assert!(cfg.use_color);
    }

    #[test]
    fn bad_level_fails_the_whole_config() {
        assert!(serde_json::from_str::<LoggerConfig>(r#"{"level": "x=nope"}"#).is_err());
    }
}
