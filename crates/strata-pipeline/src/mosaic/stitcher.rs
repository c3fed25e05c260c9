use std::{fs, future::Future, path::PathBuf, sync::Arc};

use strata_core::{WaitOutcome, Waiter};
use strata_model::LayerId;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    error::PipelineResult,
    mosaic::{AssembleRequest, FftRequest, HostOps, MosaicConfig, StosRequest, VolumeRequest},
};

/// Minimum tile count for a slice directory to be mosaicked.
const MIN_TILES: usize = 2;

/// Why a step did not complete.
enum Halt {
    Failed(String),
    Canceled,
}

/// A slice that made it through assembly.
#[derive(Debug, Clone)]
struct Assembled {
    index: u32,
    directory: PathBuf,
    image: PathBuf,
}

/// Outcome of one stitching run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StitchReport {
    /// Slices whose mosaic and image were produced, in index order.
    pub assembled: Vec<u32>,
    /// Missing directories or directories with fewer than two tiles.
    pub skipped: Vec<u32>,
    /// Slices excluded because a step failed or timed out.
    pub failed: Vec<u32>,
    /// Transforms produced for adjacent assembled slices.
    pub stos: Vec<PathBuf>,
    /// Adjacent pairs whose registration failed.
    pub stos_failed: Vec<(u32, u32)>,
    /// Volume output prefix, once slice-to-volume completed.
    pub volume: Option<PathBuf>,
    pub canceled: bool,
}

impl StitchReport {
    /// Every present slice and every registration completed.
    pub fn is_success(&self) -> bool {
        !self.canceled && self.failed.is_empty() && self.stos_failed.is_empty()
    }
}

/// Drives the stitching flow through [`HostOps`], awaiting every produced
/// layer before its output is used.
pub struct Stitcher {
    host: Arc<dyn HostOps>,
    waiter: Waiter,
    config: MosaicConfig,
}

impl Stitcher {
    /// The waiter polls with the configured interval.
    pub fn new(host: Arc<dyn HostOps>, waiter: Waiter, config: MosaicConfig) -> Self {
        let waiter = waiter.with_poll_interval(config.poll_interval());
        Self { host, waiter, config }
    }

    pub fn config(&self) -> &MosaicConfig {
        &self.config
    }

    pub async fn run(&self, cancel: &CancellationToken) -> PipelineResult<StitchReport> {
        self.config.validate()?;
        let mut report = StitchReport::default();
        let mut assembled = Vec::new();

        for index in self.config.first_slice..=self.config.last_slice {
            let directory = self.config.slice_dir(index);
            let tiles = match fs::read_dir(&directory) {
                Ok(entries) => entries.count(),
                Err(_) => {
                    debug!(slice = index, dir = %directory.display(), "no slice directory");
                    report.skipped.push(index);
                    continue;
                }
            };
            if tiles < MIN_TILES {
                debug!(slice = index, tiles, "too few tiles to mosaic");
                report.skipped.push(index);
                continue;
            }

            match self.slice(index, directory, cancel).await {
                Ok(slice) => {
                    report.assembled.push(index);
                    assembled.push(slice);
                }
                Err(Halt::Canceled) => {
                    report.canceled = true;
                    return Ok(report);
                }
                Err(Halt::Failed(reason)) => {
                    warn!(slice = index, %reason, "slice excluded");
                    report.failed.push(index);
                }
            }
        }

        for pair in assembled.windows(2) {
            let (fixed, moving) = (&pair[0], &pair[1]);
            let req = StosRequest {
                input_fixed: fixed.image.clone(),
                input_moving: moving.image.clone(),
                output_stos: self.config.stos_path(fixed.index, moving.index),
                shrink_factor: self.config.fft.shrink_factor,
            };
            let label = format!("stos {}-{}", fixed.index, moving.index);
            match self.step(&label, self.host.slice_to_slice(&req), cancel).await {
                Ok(()) => report.stos.push(req.output_stos),
                Err(Halt::Failed(reason)) => {
                    warn!(fixed = fixed.index, moving = moving.index, %reason, "slice registration failed");
                    report.stos_failed.push((fixed.index, moving.index));
                }
                Err(Halt::Canceled) => {
                    report.canceled = true;
                    return Ok(report);
                }
            }
        }

        if report.stos.is_empty() {
            info!(assembled = report.assembled.len(), "no slice transforms, volume skipped");
            return Ok(report);
        }
        // The volume needs one unbroken transform chain across every assembled slice.
        if !report.stos_failed.is_empty() {
            warn!(broken = ?report.stos_failed, "slice transform chain incomplete, volume skipped");
            return Ok(report);
        }
        let req = VolumeRequest {
            input_files: report.stos.clone(),
            output_prefixes: vec![self.config.volume_prefix()],
            image_dirs: assembled.iter().map(|s| s.directory.clone()).collect(),
            shrink_factor: 1,
        };
        match self.step("volume", self.host.slice_to_volume(&req), cancel).await {
            Ok(()) => report.volume = Some(self.config.volume_prefix()),
            Err(Halt::Failed(reason)) => warn!(%reason, "volume assembly failed"),
            Err(Halt::Canceled) => report.canceled = true,
        }
        info!(
            assembled = report.assembled.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            volume = report.volume.is_some(),
            "stitching finished"
        );
        Ok(report)
    }

    /// Fourier mosaic then assembly of one slice.
    async fn slice(
        &self,
        index: u32,
        directory: PathBuf,
        cancel: &CancellationToken,
    ) -> Result<Assembled, Halt> {
        let fft = FftRequest {
            directory: directory.clone(),
            output_mosaic: self.config.mosaic_path(index),
            params: self.config.fft.clone(),
        };
        let label = format!("fft {index}");
        self.step(&label, self.host.fft_mosaic(&fft), cancel).await?;

        let assemble = AssembleRequest {
            input_mosaic: fft.output_mosaic,
            output_image: self.config.image_path(index),
            directory: directory.clone(),
            shrink_factor: 1,
        };
        let label = format!("assemble {index}");
        self.step(&label, self.host.assemble(&assemble), cancel).await?;
        Ok(Assembled {
            index,
            directory,
            image: assemble.output_image,
        })
    }

    /// Start one HOST operation and wait for its layer.
    async fn step(
        &self,
        label: &str,
        start: impl Future<Output = PipelineResult<LayerId>>,
        cancel: &CancellationToken,
    ) -> Result<(), Halt> {
        if cancel.is_cancelled() {
            return Err(Halt::Canceled);
        }
        let layer = start
            .await
            .map_err(|e| Halt::Failed(format!("{label}: {e}")))?;
        debug!(step = label, layer = %layer, "host operation started");

        match self
            .waiter
            .wait_available(&layer, self.config.layer_timeout(), cancel)
            .await
        {
            Ok(WaitOutcome::Reached { .. }) => Ok(()),
            Ok(WaitOutcome::Canceled { .. }) => Err(Halt::Canceled),
            Ok(outcome) => Err(Halt::Failed(format!(
                "{label}: layer {layer} {}",
                outcome.as_label()
            ))),
            Err(e) => Err(Halt::Failed(format!("{label}: {e}"))),
        }
    }
}
