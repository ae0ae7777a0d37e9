//! Incremental peak detector
//!
//! A frame `i` is accepted as a peak when:
//! 1. its strength is positive and exceeds the adaptive threshold at `i`
//! 2. it is strictly greater than every frame in `[i - r, i)` and greater than or equal
//!    to every frame in `(i, i + r]` (plateaus resolve to their earliest frame)
//! 3. it lies at least `min_separation` frames after the last accepted peak
//!
//! Frame 0 has no left neighbor and is never a peak. The detector evaluates a frame once
//! its `r` right neighbors have arrived; [`PeakDetector::finish`] evaluates the tail of a
//! finite buffer with whatever right neighbors exist, so the last frame is judged against
//! its left neighbors only.
//!
//! # Example
//!
//! ```
//! use stratum_tempo::features::onset::peak_detector::PeakDetector;
//!
//! let strengths = [0.0, 0.1, 1.0, 0.1, 0.0, 0.0, 0.1, 0.9, 0.1, 0.0];
//! let mut detector = PeakDetector::new(4, 1.0, 1, 3);
//! let peaks = detector.detect(&strengths);
//! let indices: Vec<usize> = peaks.iter().map(|p| p.frame_index).collect();
//! assert_eq!(indices, vec![2, 7]);
//! ```

use std::collections::VecDeque;

use super::threshold::MovingAverageThreshold;
use super::PeakEvent;
use crate::config::AnalysisConfig;

/// Stateful peak detector over a stream of onset strengths
#[derive(Debug, Clone)]
pub struct PeakDetector {
    threshold: MovingAverageThreshold,
    /// (strength, threshold) for the most recent `2r + 1` frames
    recent: VecDeque<(f32, f32)>,
    neighborhood: usize,
    min_separation: usize,
    /// Global index of the next frame to be pushed
    next_index: usize,
    /// Global index of the next frame awaiting evaluation
    next_to_evaluate: usize,
    last_peak: Option<usize>,
}

impl PeakDetector {
    /// Create a detector
    ///
    /// # Arguments
    ///
    /// * `threshold_window` - Trailing moving-average window in frames
    /// * `sensitivity` - Threshold multiplier over the trailing mean
    /// * `neighborhood` - Local-maximum half-width `r` in frames (raised to 1 if 0)
    /// * `min_separation` - Minimum frames between accepted peaks
    pub fn new(
        threshold_window: usize,
        sensitivity: f32,
        neighborhood: usize,
        min_separation: usize,
    ) -> Self {
        let neighborhood = neighborhood.max(1);
        Self {
            threshold: MovingAverageThreshold::new(threshold_window, sensitivity),
            recent: VecDeque::with_capacity(2 * neighborhood + 1),
            neighborhood,
            min_separation,
            next_index: 0,
            next_to_evaluate: 0,
            last_peak: None,
        }
    }

    /// Create a detector from analysis configuration
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(
            config.threshold_window,
            config.sensitivity,
            config.neighborhood,
            config.min_peak_separation,
        )
    }

    /// Push the next frame's strength, returning a peak if one is confirmed
    ///
    /// A confirmed peak lags the newest frame by `neighborhood` frames.
    pub fn push(&mut self, strength: f32) -> Option<PeakEvent> {
        let threshold = self.threshold.update(strength);
        self.recent.push_back((strength, threshold));
        if self.recent.len() > 2 * self.neighborhood + 1 {
            self.recent.pop_front();
        }
        self.next_index += 1;

        if self.next_to_evaluate + self.neighborhood < self.next_index {
            let index = self.next_to_evaluate;
            self.next_to_evaluate += 1;
            return self.evaluate(index);
        }
        None
    }

    /// Evaluate the remaining frames of a finite buffer
    ///
    /// Only call this at the true end of the audio: a streaming session keeps the tail
    /// pending until the next chunk supplies its right neighbors.
    pub fn finish(&mut self) -> Vec<PeakEvent> {
        let mut peaks = Vec::new();
        while self.next_to_evaluate < self.next_index {
            let index = self.next_to_evaluate;
            self.next_to_evaluate += 1;
            if let Some(peak) = self.evaluate(index) {
                peaks.push(peak);
            }
        }
        peaks
    }

    /// Run a complete strength sequence through the detector
    pub fn detect(&mut self, strengths: &[f32]) -> Vec<PeakEvent> {
        let mut peaks: Vec<PeakEvent> = strengths.iter().filter_map(|&s| self.push(s)).collect();
        peaks.extend(self.finish());
        peaks
    }

    /// Number of frames pushed so far
    pub fn frames_seen(&self) -> usize {
        self.next_index
    }

    /// Frame index of the most recently accepted peak
    pub fn last_peak(&self) -> Option<usize> {
        self.last_peak
    }

    /// Return to the initial state
    pub fn reset(&mut self) {
        self.threshold.reset();
        self.recent.clear();
        self.next_index = 0;
        self.next_to_evaluate = 0;
        self.last_peak = None;
    }

    fn evaluate(&mut self, index: usize) -> Option<PeakEvent> {
        if index == 0 {
            return None;
        }

        let base = self.next_index - self.recent.len();
        let pos = index.checked_sub(base)?;
        let (strength, threshold) = *self.recent.get(pos)?;

        if strength <= 0.0 || strength <= threshold {
            return None;
        }

        let left_start = pos.saturating_sub(self.neighborhood);
        let right_end = (pos + self.neighborhood).min(self.recent.len() - 1);

        let left_lower = (left_start..pos).all(|j| self.recent[j].0 < strength);
        let right_not_higher = (pos + 1..=right_end).all(|j| self.recent[j].0 <= strength);
        if !(left_lower && right_not_higher) {
            return None;
        }

        if let Some(last) = self.last_peak {
            if index - last < self.min_separation {
                return None;
            }
        }

        self.last_peak = Some(index);
        Some(PeakEvent {
            frame_index: index,
            strength,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A spike every `period` frames with a short decaying tail
    fn pulse_train(frames: usize, period: usize, offset: usize) -> Vec<f32> {
        (0..frames)
            .map(|i| {
                if i < offset {
                    return 0.0;
                }
                let phase = (i - offset) % period;
                match phase {
                    0 => 1.0,
                    1 => 0.5,
                    2 => 0.2,
                    _ => 0.01,
                }
            })
            .collect()
    }

    #[test]
    fn test_periodic_pulses() {
        let strengths = pulse_train(400, 43, 10);
        let mut detector = PeakDetector::new(86, 1.5, 2, 20);
        let peaks = detector.detect(&strengths);

        assert!(peaks.len() >= 8, "expected ~10 peaks, got {}", peaks.len());
        for w in peaks.windows(2) {
            assert_eq!(w[1].frame_index - w[0].frame_index, 43);
        }
        assert_eq!(peaks[0].frame_index, 10);
    }

    #[test]
    fn test_silence_has_no_peaks() {
        let mut detector = PeakDetector::new(86, 1.5, 2, 20);
        assert!(detector.detect(&vec![0.0; 500]).is_empty());
    }

    #[test]
    fn test_first_frame_never_peak() {
        let mut detector = PeakDetector::new(4, 0.5, 1, 1);
        let peaks = detector.detect(&[5.0, 1.0, 0.5, 0.2]);
        assert!(peaks.iter().all(|p| p.frame_index != 0));
    }

    #[test]
    fn test_last_frame_uses_left_neighbors_only() {
        let mut detector = PeakDetector::new(8, 1.0, 2, 1);
        let peaks = detector.detect(&[0.1, 0.1, 0.1, 0.2, 0.3, 2.0]);
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].frame_index, 5);
    }

    #[test]
    fn test_plateau_resolves_to_earliest() {
        let mut detector = PeakDetector::new(16, 1.0, 2, 1);
        let peaks = detector.detect(&[0.0, 0.1, 1.0, 1.0, 1.0, 0.1, 0.0, 0.0]);
        assert_eq!(peaks.len(), 1);
        assert_eq!(peaks[0].frame_index, 2);
    }

    #[test]
    fn test_min_separation_invariant() {
        // Spikes every 5 frames, separation 12: spacing must respect 12
        let strengths: Vec<f32> = (0..300).map(|i| if i % 5 == 0 { 1.0 } else { 0.05 }).collect();
        let mut detector = PeakDetector::new(20, 1.2, 1, 12);
        let peaks = detector.detect(&strengths);
        assert!(!peaks.is_empty());
        for w in peaks.windows(2) {
            assert!(w[1].frame_index - w[0].frame_index >= 12);
        }
    }

    #[test]
    fn test_below_threshold_rejected() {
        // Flat-ish signal with a tiny bump: the threshold (1.5x mean) suppresses it
        let mut strengths = vec![1.0f32; 50];
        strengths[25] = 1.2;
        let mut detector = PeakDetector::new(20, 1.5, 2, 1);
        assert!(detector.detect(&strengths).is_empty());
    }

    #[test]
    fn test_incremental_matches_batch() {
        let strengths = pulse_train(300, 37, 5);
        let mut batch = PeakDetector::new(86, 1.5, 2, 20);
        let expected = batch.detect(&strengths);

        let mut incremental = PeakDetector::new(86, 1.5, 2, 20);
        let mut peaks = Vec::new();
        for chunk in strengths.chunks(17) {
            peaks.extend(chunk.iter().filter_map(|&s| incremental.push(s)));
        }
        peaks.extend(incremental.finish());
        assert_eq!(peaks, expected);
        assert_eq!(incremental.frames_seen(), 300);
    }

    #[test]
    fn test_zero_neighborhood_still_requires_local_maximum() {
        let mut detector = PeakDetector::new(4, 0.5, 0, 1);
        let peaks = detector.detect(&[0.0, 0.5, 1.0, 0.5, 0.0]);
        let indices: Vec<usize> = peaks.iter().map(|p| p.frame_index).collect();
        assert_eq!(indices, vec![2]);
    }

    #[test]
    fn test_reset() {
        let mut detector = PeakDetector::new(8, 1.0, 1, 1);
        detector.detect(&[0.0, 1.0, 0.0]);
        assert!(detector.last_peak().is_some());
        detector.reset();
        assert_eq!(detector.frames_seen(), 0);
        assert!(detector.last_peak().is_none());
    }
}
