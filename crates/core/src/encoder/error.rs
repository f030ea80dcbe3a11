//! Error types for the encoder module.

use std::path::PathBuf;
use thiserror::Error;

use super::types::EncodePass;

/// Errors that can occur during encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// The encoder binary could not be found.
    #[error("Encoder not found at path: {path}")]
    EncoderNotFound { path: PathBuf },

    /// Input file not found.
    #[error("Input file not found: {path}")]
    InputNotFound { path: PathBuf },

    /// Output directory does not exist and could not be created.
    #[error("Failed to create output directory: {path}")]
    OutputDirectoryFailed { path: PathBuf },

    /// An encode pass exited with a nonzero status.
    #[error("Encode {pass} failed: {stderr}")]
    PassFailed { pass: EncodePass, stderr: String },

    /// An encode pass exceeded its timeout and was killed.
    #[error("Encode {pass} timed out after {timeout_secs} seconds")]
    Timeout { pass: EncodePass, timeout_secs: u64 },

    /// I/O error while launching or supervising the encoder process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EncodeError {
    /// Creates a pass-failed error from the captured error stream.
    pub fn pass_failed(pass: EncodePass, stderr: impl Into<String>) -> Self {
        let stderr = stderr.into();
        Self::PassFailed {
            pass,
            stderr: if stderr.trim().is_empty() {
                "unknown error".to_string()
            } else {
                stderr.trim().to_string()
            },
        }
    }
}
