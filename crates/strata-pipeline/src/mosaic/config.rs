use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};

use crate::{
    config::require_dir,
    error::{PipelineError, PipelineResult},
};

/// Default wait for one HOST layer: ten minutes.
pub const DEFAULT_LAYER_TIMEOUT_MS: u64 = 600_000;

fn default_image_ext() -> String {
    ".png".into()
}

fn default_layer_timeout_ms() -> u64 {
    DEFAULT_LAYER_TIMEOUT_MS
}

fn default_poll_interval_ms() -> u64 {
    100
}

/// Tuning of the HOST Fourier mosaic filter. Passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FftParams {
    pub shrink_factor: u32,
    pub pixel_spacing: f64,
    pub overlap_min: f64,
    pub overlap_max: f64,
    pub tile_strategy: String,
    pub min_peak: f64,
    pub peak_threshold: f64,
    pub iterations_per_level: u32,
    pub pyramid_levels: u32,
}

/// Stitching run over slice directories `<root>/<numberPrefix><index>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MosaicConfig {
    pub root: PathBuf,
    /// Extension of assembled slice images, dot included.
    #[serde(default = "default_image_ext")]
    pub image_ext: String,
    #[serde(default)]
    pub number_prefix: String,
    pub first_slice: u32,
    /// Inclusive.
    pub last_slice: u32,
    pub fft: FftParams,
    #[serde(default = "default_layer_timeout_ms")]
    pub layer_timeout_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl MosaicConfig {
    pub fn load(path: &Path) -> PipelineResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        serde_json::from_str(&text)
            .map_err(|e| PipelineError::Config(format!("{}: {e}", path.display())))
    }

    pub fn validate(&self) -> PipelineResult<()> {
        require_dir("root", &self.root)?;
        if self.first_slice > self.last_slice {
            return Err(PipelineError::Config(format!(
                "firstSlice {} is after lastSlice {}",
                self.first_slice, self.last_slice
            )));
        }
        if self.fft.shrink_factor == 0 {
            return Err(PipelineError::Config("fft.shrinkFactor must be at least 1".into()));
        }
        if self.fft.overlap_min > self.fft.overlap_max {
            return Err(PipelineError::Config(
                "fft.overlapMin cannot exceed fft.overlapMax".into(),
            ));
        }
        if self.layer_timeout_ms == 0 {
            return Err(PipelineError::Config("layerTimeoutMs cannot be zero".into()));
        }
        Ok(())
    }

    pub fn layer_timeout(&self) -> Duration {
        Duration::from_millis(self.layer_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn slice_dir(&self, index: u32) -> PathBuf {
        self.root.join(format!("{}{index}", self.number_prefix))
    }

    pub fn mosaic_path(&self, index: u32) -> PathBuf {
        self.root.join(format!("slice{index}.mosaic"))
    }

    pub fn image_path(&self, index: u32) -> PathBuf {
        self.root.join(format!("slice{index}{}", self.image_ext))
    }

    pub fn stos_path(&self, fixed: u32, moving: u32) -> PathBuf {
        self.root.join(format!("{fixed}-{moving}.stos"))
    }

    pub fn volume_prefix(&self) -> PathBuf {
        self.root.join("vol")
    }
}
