//! Pipeline configuration.
//!
//! Everything the classifier pipeline needs is passed explicitly in one
//! [`PipelineConfig`], loaded from JSON and validated before any job runs.
mod inputs;
pub use inputs::InputDirs;

mod params;
pub use params::{
    BlurParams, FeatureParams, LabelParams, MergeParams, PadParams, PreMergeParams,
    SegmentParams, StageParams, TrainParams, WatershedParams,
};

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strata_exec::ExecConfig;
use strata_model::BatchPolicy;
use strata_observe::LoggerConfig;

use crate::error::{PipelineError, PipelineResult};

/// Parallel jobs per stage unless configured otherwise.
pub const DEFAULT_MAX_PARALLEL: usize = 70;

fn default_policy() -> BatchPolicy {
    BatchPolicy::with_concurrency(DEFAULT_MAX_PARALLEL)
}

fn enabled() -> bool {
    true
}

/// Complete description of one pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    pub inputs: InputDirs,
    /// Directory holding the classifier binaries (`watershed`, `bc_feat`, ...).
    pub bin_dir: PathBuf,
    /// Directory holding `blur_image` and `PadImage`; required by `blur` and `pad`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools_dir: Option<PathBuf>,
    /// Root of the per-stage result directories; created when missing.
    pub results_dir: PathBuf,
    /// Produce the blurred boundary maps from the boundary maps first.
    #[serde(default)]
    pub blur: bool,
    /// Pad final segmentations back to the uncropped size.
    #[serde(default)]
    pub pad: bool,
    /// Skip later stages once a stage has failed jobs.
    #[serde(default = "enabled")]
    pub halt_on_failure: bool,
    #[serde(default = "default_policy")]
    pub policy: BatchPolicy,
    #[serde(default)]
    pub params: StageParams,
    #[serde(default)]
    pub exec: ExecConfig,
    #[serde(default)]
    pub logger: LoggerConfig,
}

impl PipelineConfig {
    /// Minimal config with default parameters.
    pub fn new(inputs: InputDirs, bin_dir: impl Into<PathBuf>, results_dir: impl Into<PathBuf>) -> Self {
        Self {
            inputs,
            bin_dir: bin_dir.into(),
            tools_dir: None,
            results_dir: results_dir.into(),
            blur: false,
            pad: false,
            halt_on_failure: true,
            policy: default_policy(),
            params: StageParams::default(),
            exec: ExecConfig::default(),
            logger: LoggerConfig::default(),
        }
    }

    /// Read and parse a JSON config file. Does not validate.
    pub fn load(path: &Path) -> PipelineResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        serde_json::from_str(&text)
            .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))
    }

    /// Check required directories and value ranges.
    pub fn validate(&self) -> PipelineResult<()> {
        self.inputs.validate(self.blur)?;
        require_dir("binDir", &self.bin_dir)?;
        if self.results_dir.as_os_str().is_empty() {
            return Err(PipelineError::Config("resultsDir cannot be empty".into()));
        }
        if self.blur || self.pad {
            let tools = self.tools_dir.as_deref().ok_or_else(|| {
                PipelineError::Config("toolsDir is required when blur or pad is enabled".into())
            })?;
            require_dir("toolsDir", tools)?;
        }
        self.policy.validate()?;
        self.exec
            .validate()
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        self.params.validate()
    }

    /// `tools_dir` joined with `tool`; validation guarantees presence when needed.
    pub(crate) fn tool(&self, tool: &str) -> PathBuf {
        self.tools_dir
            .as_deref()
            .unwrap_or_else(|| Path::new(""))
            .join(tool)
    }

    pub(crate) fn bin(&self, tool: &str) -> PathBuf {
        self.bin_dir.join(tool)
    }
}

pub(crate) fn require_dir(field: &str, path: &Path) -> PipelineResult<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(PipelineError::Config(format!(
            "{field} {} is not a directory",
            path.display()
        )))
    }
}
