use thiserror::Error;

#[derive(Error, Debug)]
pub enum CareError {
    #[error("Document decode failed: {0}")]
    Decode(String),

    #[error("Unsupported document kind: {0}")]
    UnsupportedKind(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Background task failed: {0}")]
    TaskJoin(String),
}

pub type Result<T> = std::result::Result<T, CareError>;
