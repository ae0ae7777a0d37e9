//! Temporal smoothing of BPM candidates
//!
//! Single-shot analysis collapses the whole filtered pool with a central tendency.
//! Streaming analysis collapses each chunk the same way and blends it into the running
//! estimate with an exponential moving average:
//!
//! `new = alpha * chunk + (1 - alpha) * previous`
//!
//! A chunk without candidates carries the previous estimate forward unchanged.

use serde::{Deserialize, Serialize};

use super::stats;
use crate::error::AnalysisError;

/// Statistic used to collapse a candidate pool into one BPM value
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CentralTendency {
    /// Median of the pool
    #[default]
    Median,
    /// Arithmetic mean of the pool
    Mean,
    /// Mean after trimming `proportion` of values from each end, in [0, 0.5)
    TrimmedMean {
        /// Fraction trimmed from each end
        proportion: f32,
    },
    /// Mean of the sliding-window means (window must be > 0)
    ///
    /// Falls back to the plain mean when the pool is shorter than the window.
    MovingAverage {
        /// Window length in candidates
        window: usize,
    },
}

impl CentralTendency {
    /// Collapse values into one; `None` for an empty pool
    pub fn apply(&self, values: &[f32]) -> Option<f32> {
        match *self {
            CentralTendency::Median => stats::median(values),
            CentralTendency::Mean => stats::mean(values),
            CentralTendency::TrimmedMean { proportion } => stats::trimmed_mean(values, proportion),
            CentralTendency::MovingAverage { window } => {
                stats::mean(&stats::moving_average(values, window))
            }
        }
    }

    pub(crate) fn validate(&self) -> Result<(), AnalysisError> {
        match *self {
            CentralTendency::TrimmedMean { proportion } if !(0.0..0.5).contains(&proportion) => {
                Err(AnalysisError::InvalidConfig(format!(
                    "Trimmed mean proportion must be in [0, 0.5), got {}",
                    proportion
                )))
            }
            CentralTendency::MovingAverage { window: 0 } => Err(AnalysisError::InvalidConfig(
                "Moving average window must be > 0".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Candidate smoother
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Smoother {
    /// Statistic applied to each pool
    pub central_tendency: CentralTendency,
    /// EMA factor in (0, 1]
    pub alpha: f32,
}

impl Smoother {
    /// Create a smoother
    pub fn new(central_tendency: CentralTendency, alpha: f32) -> Self {
        Self {
            central_tendency,
            alpha,
        }
    }

    /// Central tendency of a complete pool (single-shot mode)
    pub fn single_shot(&self, values: &[f32]) -> Option<f32> {
        self.central_tendency.apply(values)
    }

    /// Blend a chunk's candidates into the previous estimate (streaming mode)
    ///
    /// Returns the previous estimate unchanged when the chunk is empty, and the chunk's
    /// central tendency when there is no previous estimate.
    pub fn update(&self, chunk: &[f32], previous: Option<f32>) -> Option<f32> {
        let Some(current) = self.central_tendency.apply(chunk) else {
            return previous;
        };
        match previous {
            Some(prev) => Some(self.alpha * current + (1.0 - self.alpha) * prev),
            None => Some(current),
        }
    }
}
