//! Error types shared across Rowcast crates.

use std::path::PathBuf;

/// Top-level error type for Rowcast operations.
#[derive(Debug, thiserror::Error)]
pub enum RowcastError {
    #[error("Dataset error: {message}")]
    Dataset { message: String },

    #[error("Video error: {message}")]
    Video { message: String },

    #[error("Recording error: {message}")]
    Recording { message: String },

    #[error("Processing error: {message}")]
    Processing { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(
        "Frame out of range in {path}: timestamp {timestamp}s maps to frame {index}, \
         but only {frame_count} frame(s) were decoded"
    )]
    FrameOutOfRange {
        path: PathBuf,
        timestamp: f64,
        index: i64,
        frame_count: usize,
    },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using RowcastError.
pub type RowcastResult<T> = Result<T, RowcastError>;

impl RowcastError {
    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset {
            message: msg.into(),
        }
    }

    pub fn video(msg: impl Into<String>) -> Self {
        Self::Video {
            message: msg.into(),
        }
    }

    pub fn recording(msg: impl Into<String>) -> Self {
        Self::Recording {
            message: msg.into(),
        }
    }

    pub fn processing(msg: impl Into<String>) -> Self {
        Self::Processing {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }
}
