use std::path::PathBuf;

use async_trait::async_trait;
use strata_model::LayerId;

use crate::{error::PipelineResult, mosaic::FftParams};

#[derive(Debug, Clone, PartialEq)]
pub struct FftRequest {
    /// Directory holding the slice's tiles.
    pub directory: PathBuf,
    pub output_mosaic: PathBuf,
    pub params: FftParams,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleRequest {
    pub input_mosaic: PathBuf,
    pub output_image: PathBuf,
    pub directory: PathBuf,
    pub shrink_factor: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StosRequest {
    pub input_fixed: PathBuf,
    pub input_moving: PathBuf,
    pub output_stos: PathBuf,
    pub shrink_factor: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeRequest {
    pub input_files: Vec<PathBuf>,
    pub output_prefixes: Vec<PathBuf>,
    pub image_dirs: Vec<PathBuf>,
    pub shrink_factor: u32,
}

/// Operations the HOST application exposes to the stitching flow.
///
/// Each call only starts the operation and returns the layer it will write.
/// Completion is observed through the layer status, never through the call.
#[async_trait]
pub trait HostOps: Send + Sync {
    async fn fft_mosaic(&self, req: &FftRequest) -> PipelineResult<LayerId>;

    async fn assemble(&self, req: &AssembleRequest) -> PipelineResult<LayerId>;

    async fn slice_to_slice(&self, req: &StosRequest) -> PipelineResult<LayerId>;

    async fn slice_to_volume(&self, req: &VolumeRequest) -> PipelineResult<LayerId>;
}
