use std::path::PathBuf;

use strata_model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid batch: {0}")]
    InvalidBatch(String),

    #[error("duplicate job id '{0}' in batch")]
    DuplicateJob(String),

    #[error("output {} is declared by both '{first}' and '{second}'", .path.display())]
    DuplicateOutput {
        path: PathBuf,
        first: String,
        second: String,
    },

    #[error("no output check registered under '{0}'")]
    UnknownCheck(String),

    #[error("output check '{0}' is already registered")]
    DuplicateCheck(String),

    #[error("output check task failed: {0}")]
    CheckAborted(String),

    #[error("model error: {0}")]
    Model(#[from] ModelError),
}
