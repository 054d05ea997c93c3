use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read chunk file {}: {source}", path.display())]
    ChunkRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Chunk file {} has {len} bytes, not a whole number of float32 values", path.display())]
    InvalidChunkLength { path: PathBuf, len: usize },

    #[error("Date parsing error in '{filename}': {source}")]
    DateParse {
        filename: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to replace metadata file: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    #[error("No chunk files for {timestamp} under either padded or unpadded naming")]
    MissingChunkConvention { timestamp: String },
}

impl From<config::ConfigError> for ProcessingError {
    fn from(err: config::ConfigError) -> Self {
        ProcessingError::Config(err.to_string())
    }
}
