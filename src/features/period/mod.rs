//! Period estimation modules
//!
//! Convert the peak list to BPM candidates using:
//! - Inter-peak intervals with a plausibility band
//! - IQR outlier filtering

pub mod candidate_filter;
pub mod intervals;

use serde::{Deserialize, Serialize};

/// Instantaneous tempo derived from two consecutive peaks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BpmCandidate {
    /// Tempo in beats per minute
    pub bpm: f32,

    /// Frame index of the earlier peak
    pub from_frame: usize,

    /// Frame index of the later peak
    pub to_frame: usize,
}

/// Extract the BPM values of a candidate pool
pub fn bpm_values(candidates: &[BpmCandidate]) -> Vec<f32> {
    candidates.iter().map(|c| c.bpm).collect()
}
