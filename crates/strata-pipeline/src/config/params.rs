use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};

/// Tool parameters per stage. Defaults are the values the classifier
/// tooling was tuned with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StageParams {
    pub watershed: WatershedParams,
    pub pre_merge: PreMergeParams,
    pub merge: MergeParams,
    pub features: FeatureParams,
    pub labels: LabelParams,
    pub training: TrainParams,
    pub segment: SegmentParams,
    pub blur: BlurParams,
    pub pad: PadParams,
}

impl StageParams {
    pub fn validate(&self) -> PipelineResult<()> {
        let [lo, hi] = self.pre_merge.size_thresholds;
        if lo > hi {
            return invalid(format!("preMerge.sizeThresholds {lo} > {hi}"));
        }
        if !(0.0..=1.0).contains(&self.segment.threshold) {
            return invalid(format!("segment.threshold {} not in [0, 1]", self.segment.threshold));
        }
        if !(self.training.sample_ratio > 0.0 && self.training.sample_ratio <= 1.0) {
            return invalid(format!(
                "training.sampleRatio {} not in (0, 1]",
                self.training.sample_ratio
            ));
        }
        if self.training.trees == 0 {
            return invalid("training.trees must be at least 1".into());
        }
        if self.features.ray_bins == 0 {
            return invalid("features.rayBins must be at least 1".into());
        }
        if self.blur.kernel_width % 2 == 0 {
            return invalid(format!("blur.kernelWidth {} must be odd", self.blur.kernel_width));
        }
        Ok(())
    }
}

fn invalid(msg: String) -> PipelineResult<()> {
    Err(PipelineError::Config(msg))
}

/// `watershed`: initial superpixels from the blurred boundary map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WatershedParams {
    /// Initial water level (`-l`).
    pub water_level: f64,
    /// Watershed threshold (`-t`).
    pub threshold: f64,
}

impl Default for WatershedParams {
    fn default() -> Self {
        Self {
            water_level: 0.008,
            threshold: 0.001,
        }
    }
}

/// `pre_merge`: merges small superpixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PreMergeParams {
    /// Region size thresholds (`-t lo hi`).
    pub size_thresholds: [u32; 2],
    /// Boundary threshold (`-b`).
    pub boundary_threshold: f64,
}

impl Default for PreMergeParams {
    fn default() -> Self {
        Self {
            size_thresholds: [100, 500],
            boundary_threshold: 3.0,
        }
    }
}

/// `merge_order_pb`: merge tree and saliencies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MergeParams {
    /// Merge criterion (`-t`).
    pub criterion: u32,
}

impl Default for MergeParams {
    fn default() -> Self {
        Self { criterion: 1 }
    }
}

/// `bc_feat`: boundary features. Ray histograms are taken over the grayscale
/// image and the boundary map with the same binning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeatureParams {
    /// Histogram bins (`--rbb`).
    pub ray_bins: u32,
    /// Histogram lower bound (`--rbl`).
    pub ray_lower: f64,
    /// Histogram upper bound (`--rbu`).
    pub ray_upper: f64,
    /// Shape feature scale (`--s0`).
    pub s0: f64,
    /// Boundary feature scale (`--sb`).
    pub sb: f64,
    /// Boundary thresholds (`--bt`).
    pub boundary_thresholds: [u32; 3],
}

impl Default for FeatureParams {
    fn default() -> Self {
        Self {
            ray_bins: 16,
            ray_lower: 120.0,
            ray_upper: 255.0,
            s0: 1.0,
            sb: 1.0,
            boundary_thresholds: [70, 190, 255],
        }
    }
}

/// `bc_label_ri`: boundary labels against ground truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LabelParams {
    /// Label by F1 score (`--f1`).
    pub f1: bool,
    /// Decision threshold (`-d`).
    pub threshold: f64,
    /// Ground truth background label (`-g`).
    pub background: u32,
}

impl Default for LabelParams {
    fn default() -> Self {
        Self {
            f1: true,
            threshold: 0.5,
            background: 0,
        }
    }
}

/// `train_rf`: random forest boundary classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrainParams {
    /// Number of trees (`--nt`).
    pub trees: u32,
    /// Features tried per split, 0 for the tool default (`--mt`).
    pub mtry: u32,
    /// Sample ratio per tree (`--sr`).
    pub sample_ratio: f64,
    /// Minimum node size (`--ns`).
    pub node_size: u32,
    /// Balance classes (`--bal`).
    pub balance: bool,
}

impl Default for TrainParams {
    fn default() -> Self {
        Self {
            trees: 255,
            mtry: 0,
            sample_ratio: 0.1,
            node_size: 10,
            balance: true,
        }
    }
}

/// `segment_greedy`: final segmentation from predicted boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SegmentParams {
    /// Merge threshold (`-t`).
    pub threshold: f64,
}

impl Default for SegmentParams {
    fn default() -> Self {
        Self { threshold: 0.5 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlurParams {
    pub sigma: f64,
    pub kernel_width: u32,
}

impl Default for BlurParams {
    fn default() -> Self {
        Self {
            sigma: 1.0,
            kernel_width: 3,
        }
    }
}

/// `PadImage` bounds restoring the uncropped size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PadParams {
    pub bounds: [u32; 5],
}

impl Default for PadParams {
    fn default() -> Self {
        Self {
            bounds: [0, 0, 0, 59, 0],
        }
    }
}
