use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{config::require_dir, error::PipelineResult};

/// Input directories of the classifier pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputDirs {
    /// Grayscale training images (`.mha`); their stems are the training items.
    pub gray_training: PathBuf,
    /// Grayscale test images (`.mha`); their stems are the test items.
    pub gray_test: PathBuf,
    /// Every grayscale image, training and test, used for ray features.
    pub gray_all: PathBuf,
    /// Boundary probability maps (`.mha`).
    pub boundary: PathBuf,
    /// Blurred boundary probability maps (`.mha`); written by the blur stage.
    pub blurred: PathBuf,
    /// Ground truth label images (`.png`) for training items.
    pub truth: PathBuf,
}

impl InputDirs {
    /// With `blur` the blurred directory is an output and may not exist yet.
    pub fn validate(&self, blur: bool) -> PipelineResult<()> {
        require_dir("inputs.grayTraining", &self.gray_training)?;
        require_dir("inputs.grayTest", &self.gray_test)?;
        require_dir("inputs.grayAll", &self.gray_all)?;
        require_dir("inputs.boundary", &self.boundary)?;
        if !blur {
            require_dir("inputs.blurred", &self.blurred)?;
        }
        require_dir("inputs.truth", &self.truth)
    }
}
