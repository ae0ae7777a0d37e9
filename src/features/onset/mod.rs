//! Onset (peak) detection
//!
//! Scans the per-frame onset strength for local maxima above an adaptive threshold:
//! - Trailing moving-average threshold
//! - Incremental local-maximum peak detector with minimum separation

pub mod peak_detector;
pub mod threshold;

use serde::{Deserialize, Serialize};

/// A frame flagged as a local onset-strength maximum
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeakEvent {
    /// Frame index of the peak (global across a streaming session)
    pub frame_index: usize,

    /// Onset strength at the peak (the frame energy unless spectral flux is blended in)
    pub strength: f32,
}
