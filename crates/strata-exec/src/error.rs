use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("invalid job: {0}")]
    InvalidSpec(String),

    #[error("invalid executor configuration: {0}")]
    InvalidConfig(String),
}
