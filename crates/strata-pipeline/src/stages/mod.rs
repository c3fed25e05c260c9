//! Classifier pipeline stages and their job builders.
//!
//! Each stage turns the discovered item ids into one [`Batch`]. Stages run
//! strictly in [`Stage::ordered`] order; a stage only reads outputs of earlier
//! stages, never of its own jobs.
mod boundary;
mod merge;
mod prepost;
mod segment;
mod superpixel;

use std::{fmt, path::PathBuf, str::FromStr};

use strata_core::Batch;
use strata_model::{BatchPolicy, ItemIds, JobSpec};

use crate::{
    config::PipelineConfig,
    discovery::Discovered,
    error::{PipelineError, PipelineResult},
    layout::{InputLayout, ResultDir, ResultLayout},
};

/// One processing stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Optional pre-stage producing blurred boundary maps.
    Blur,
    /// Watershed superpixels.
    Segii,
    /// Superpixel pre-merging.
    Segi,
    /// Merge trees and saliencies.
    OrderSal,
    /// Boundary features.
    Bcf,
    /// Boundary labels, training items only.
    Bcl,
    /// Classifier training, one job.
    Bcm,
    /// Boundary predictions.
    Bcp,
    /// Final greedy segmentation.
    Seg,
    /// Optional post-stage padding final segmentations.
    Pad,
}

impl Stage {
    /// Core classifier stages in execution order.
    pub const CLASSIFIER: [Stage; 8] = [
        Stage::Segii,
        Stage::Segi,
        Stage::OrderSal,
        Stage::Bcf,
        Stage::Bcl,
        Stage::Bcm,
        Stage::Bcp,
        Stage::Seg,
    ];

    pub const ALL: [Stage; 10] = [
        Stage::Blur,
        Stage::Segii,
        Stage::Segi,
        Stage::OrderSal,
        Stage::Bcf,
        Stage::Bcl,
        Stage::Bcm,
        Stage::Bcp,
        Stage::Seg,
        Stage::Pad,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Blur => "blur",
            Stage::Segii => "segii",
            Stage::Segi => "segi",
            Stage::OrderSal => "order/sal",
            Stage::Bcf => "bcf",
            Stage::Bcl => "bcl",
            Stage::Bcm => "bcm",
            Stage::Bcp => "bcp",
            Stage::Seg => "seg",
            Stage::Pad => "pad",
        }
    }

    /// Stages enabled by `config`, in execution order, optionally restricted
    /// to `only`. Order always follows [`Stage::ALL`], not the order of `only`.
    pub fn ordered(config: &PipelineConfig, only: Option<&[Stage]>) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|s| match s {
                Stage::Blur => config.blur,
                Stage::Pad => config.pad,
                _ => true,
            })
            .filter(|s| only.is_none_or(|only| only.contains(s)))
            .collect()
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = PipelineError;
    fn from_str(s: &str) -> PipelineResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blur" => Ok(Stage::Blur),
            "segii" => Ok(Stage::Segii),
            "segi" => Ok(Stage::Segi),
            "order/sal" | "order" | "sal" | "order_sal" | "order-sal" => Ok(Stage::OrderSal),
            "bcf" => Ok(Stage::Bcf),
            "bcl" => Ok(Stage::Bcl),
            "bcm" => Ok(Stage::Bcm),
            "bcp" => Ok(Stage::Bcp),
            "seg" => Ok(Stage::Seg),
            "pad" => Ok(Stage::Pad),
            other => Err(PipelineError::Config(format!("unknown stage '{other}'"))),
        }
    }
}

/// Builds the batch of every stage from one configuration and one discovery.
#[derive(Debug, Clone)]
pub struct StagePlan {
    config: PipelineConfig,
    inputs: InputLayout,
    results: ResultLayout,
    items: ItemIds,
    boundary: Vec<PathBuf>,
}

impl StagePlan {
    pub fn new(config: &PipelineConfig, discovered: &Discovered) -> Self {
        Self {
            inputs: InputLayout::new(config.inputs.clone()),
            results: ResultLayout::new(&config.results_dir),
            items: discovered.items.clone(),
            boundary: discovered.boundary.clone(),
            config: config.clone(),
        }
    }

    pub fn items(&self) -> &ItemIds {
        &self.items
    }

    pub fn results(&self) -> &ResultLayout {
        &self.results
    }

    /// Jobs of `stage`, one per item unless the stage says otherwise.
    pub fn jobs(&self, stage: Stage) -> Vec<JobSpec> {
        match stage {
            Stage::Blur => self.blur_jobs(),
            Stage::Segii => self.watershed_jobs(),
            Stage::Segi => self.pre_merge_jobs(),
            Stage::OrderSal => self.merge_jobs(),
            Stage::Bcf => self.feature_jobs(),
            Stage::Bcl => self.label_jobs(),
            Stage::Bcm => self.train_jobs(),
            Stage::Bcp => self.predict_jobs(),
            Stage::Seg => self.segment_jobs(),
            Stage::Pad => self.pad_jobs(),
        }
    }

    /// Directories `stage` writes into; created before it runs.
    pub fn output_dirs(&self, stage: Stage) -> Vec<PathBuf> {
        let dirs: &[ResultDir] = match stage {
            Stage::Blur => return vec![self.inputs.dirs().blurred.clone()],
            Stage::Segii => &[ResultDir::Segii, ResultDir::SegiiTest],
            Stage::Segi => &[ResultDir::Segi, ResultDir::SegiTest],
            Stage::OrderSal => &[ResultDir::Order, ResultDir::Sal],
            Stage::Bcf => &[ResultDir::Bcf],
            Stage::Bcl => &[ResultDir::Bcl],
            Stage::Bcm => &[ResultDir::Bcm],
            Stage::Bcp => &[ResultDir::Bcp],
            Stage::Seg | Stage::Pad => &[ResultDir::Seg, ResultDir::SegTest],
        };
        dirs.iter().map(|d| self.results.dir(*d)).collect()
    }

    /// Configured policy with the stage's fixed overrides applied.
    ///
    /// Training runs alone with one thread; prediction, segmentation and the
    /// image tools run single-threaded.
    pub fn policy(&self, stage: Stage) -> BatchPolicy {
        let mut policy = self.config.policy.clone();
        match stage {
            Stage::Bcm => {
                policy.max_concurrency = 1;
                policy.threads_per_job = 1;
            }
            Stage::Bcp | Stage::Seg | Stage::Blur | Stage::Pad => policy.threads_per_job = 1,
            _ => {}
        }
        policy
    }

    pub fn batch(&self, stage: Stage) -> PipelineResult<Batch> {
        Ok(Batch::new(stage.name(), self.jobs(stage), self.policy(stage))?)
    }
}

/// Float argument as the tools expect it, always with a fractional part.
pub(crate) fn float_arg(v: f64) -> String {
    format!("{v:?}")
}

pub(crate) fn bool_arg(v: bool) -> &'static str {
    if v { "true" } else { "false" }
}
