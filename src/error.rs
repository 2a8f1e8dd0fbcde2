use thiserror::Error;

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("failed to persist report: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DispatchError>;
