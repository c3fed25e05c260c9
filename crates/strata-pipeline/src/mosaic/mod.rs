//! Mosaic stitching flow over the HOST application.
//!
//! Per slice directory: Fourier mosaic, then assembly. Then slice-to-slice
//! registration of every adjacent pair of assembled slices and one
//! slice-to-volume pass. Every HOST operation produces a layer that is awaited
//! with the [`strata_core::Waiter`] before the next step reads it.
mod config;
pub use config::{FftParams, MosaicConfig};

mod host;
pub use host::{AssembleRequest, FftRequest, HostOps, StosRequest, VolumeRequest};

mod stitcher;
pub use stitcher::{StitchReport, Stitcher};
