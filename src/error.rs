//! Error types for the visualizer.
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// Main error type for the visualizer
#[derive(Error, Debug)]
pub enum VisualizerError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Capture error: {0}")]
    Capture(String),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the visualizer
pub type Result<T> = std::result::Result<T, VisualizerError>;
