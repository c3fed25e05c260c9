//! Classifier pipeline and mosaic stitching flows built on `strata-core`.
//!
//! The classifier pipeline turns discovered inputs into one [`strata_core::Batch`]
//! per stage and runs the stages strictly in order. The mosaic flow drives a
//! HOST application through [`HostOps`] and waits on every produced layer.
mod error;
pub use error::{PipelineError, PipelineResult};

pub mod config;
pub use config::PipelineConfig;

pub mod discovery;
pub use discovery::{Discovered, list_files};

pub mod layout;
pub use layout::{InputLayout, ResultDir, ResultLayout};

pub mod stages;
pub use stages::{Stage, StagePlan};

mod runner;
pub use runner::{PipelineRunner, RunReport};

pub mod mosaic;
pub use mosaic::{HostOps, MosaicConfig, StitchReport, Stitcher};
