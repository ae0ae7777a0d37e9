//! Error types for the tempo estimation engine

use std::fmt;

/// Errors that can occur during tempo analysis
///
/// "No peaks" and "every candidate rejected as an outlier" are not errors; they are
/// reported through [`crate::EstimateStatus`] on an otherwise successful estimate.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Invalid configuration parameters (non-positive sizes, `min_bpm >= max_bpm`, ...)
    InvalidConfig(String),

    /// Buffer too short to hold a single analysis frame
    InsufficientAudio {
        /// Number of samples available
        samples: usize,
        /// Frame size required for one frame
        frame_size: usize,
    },

    /// Invalid input buffer (zero sample rate, multi-channel data, rate mismatch)
    InvalidInput(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
            AnalysisError::InsufficientAudio {
                samples,
                frame_size,
            } => write!(
                f,
                "Insufficient audio: {} samples, need at least {} for one frame",
                samples, frame_size
            ),
            AnalysisError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for AnalysisError {}
