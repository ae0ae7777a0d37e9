//! Adaptive thresholding for peak detection
//!
//! The threshold follows the trailing moving average of the onset strength, scaled by a
//! sensitivity factor: `threshold[i] = sensitivity * mean(strength[i-w+1..=i])`. Near the
//! start of a stream the mean is taken over the frames seen so far.

use std::collections::VecDeque;

/// Trailing moving-average threshold
///
/// Holds its own window, so each analysis call or session owns an independent instance.
#[derive(Debug, Clone)]
pub struct MovingAverageThreshold {
    window: VecDeque<f32>,
    capacity: usize,
    sum: f64,
    sensitivity: f32,
}

impl MovingAverageThreshold {
    /// Create a threshold over `window` frames (minimum 1)
    pub fn new(window: usize, sensitivity: f32) -> Self {
        let capacity = window.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
            sum: 0.0,
            sensitivity,
        }
    }

    /// Add the next frame's strength and return the threshold covering it
    pub fn update(&mut self, strength: f32) -> f32 {
        if self.window.len() == self.capacity {
            if let Some(old) = self.window.pop_front() {
                self.sum -= old as f64;
            }
        }
        self.window.push_back(strength);
        self.sum += strength as f64;

        // Guard against accumulated rounding pushing the sum slightly negative
        let mean = (self.sum.max(0.0) / self.window.len() as f64) as f32;
        self.sensitivity * mean
    }

    /// Number of frames currently averaged
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// True before the first update
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Clear the window
    pub fn reset(&mut self) {
        self.window.clear();
        self.sum = 0.0;
    }
}
