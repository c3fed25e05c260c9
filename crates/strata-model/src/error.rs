use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown layer status: {0}")]
    UnknownLayerStatus(String),

    #[error("unknown validity rule: {0}")]
    UnknownValidity(String),

    #[error("unknown cancel mode: {0}")]
    UnknownCancelMode(String),

    #[error("duplicate item id '{0}' in training and test sets")]
    DuplicateItem(String),

    #[error("invalid model: {0}")]
    Invalid(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
