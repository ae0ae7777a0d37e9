//! Interval-to-BPM conversion
//!
//! For consecutive peaks `a`, `b`:
//!
//! `delta_seconds = (b - a) * hop_size / sample_rate`, `bpm = 60 / delta_seconds`
//!
//! Candidates outside `[min_bpm, max_bpm]` are dropped here, before any statistics,
//! so near-zero intervals never produce runaway tempos.

use super::BpmCandidate;
use crate::features::onset::PeakEvent;

/// Convert a consecutive peak pair to BPM, if the pair is well-formed
fn interval_bpm(from: usize, to: usize, hop_size: usize, sample_rate: u32) -> Option<f32> {
    if to <= from || sample_rate == 0 {
        return None;
    }
    let delta_seconds = ((to - from) * hop_size) as f64 / sample_rate as f64;
    if delta_seconds <= 0.0 {
        return None;
    }
    Some((60.0 / delta_seconds) as f32)
}

/// Convert an ordered peak sequence into plausible BPM candidates
///
/// # Arguments
///
/// * `peaks` - Peaks in ascending frame order
/// * `hop_size` - Hop size in samples
/// * `sample_rate` - Sample rate in Hz
/// * `min_bpm` / `max_bpm` - Plausibility band (inclusive)
///
/// # Returns
///
/// One candidate per consecutive peak pair inside the band. Fewer than two peaks
/// yield an empty pool.
pub fn convert(
    peaks: &[PeakEvent],
    hop_size: usize,
    sample_rate: u32,
    min_bpm: f32,
    max_bpm: f32,
) -> Vec<BpmCandidate> {
    let mut tracker = IntervalTracker::new(hop_size, sample_rate, min_bpm, max_bpm);
    let candidates: Vec<BpmCandidate> = peaks.iter().filter_map(|p| tracker.push(p)).collect();

    log::debug!(
        "Converted {} peaks into {} plausible candidates ({} rejected by {:.0}-{:.0} BPM band)",
        peaks.len(),
        candidates.len(),
        peaks.len().saturating_sub(1) - candidates.len(),
        min_bpm,
        max_bpm
    );

    candidates
}

/// Incremental converter that remembers the last peak
///
/// Lets a streaming session derive an interval from a peak in the previous chunk and
/// one in the current chunk.
#[derive(Debug, Clone)]
pub struct IntervalTracker {
    hop_size: usize,
    sample_rate: u32,
    min_bpm: f32,
    max_bpm: f32,
    last_peak: Option<usize>,
}

impl IntervalTracker {
    /// Create a tracker with the given framing and plausibility band
    pub fn new(hop_size: usize, sample_rate: u32, min_bpm: f32, max_bpm: f32) -> Self {
        Self {
            hop_size,
            sample_rate,
            min_bpm,
            max_bpm,
            last_peak: None,
        }
    }

    /// Register a peak; returns the candidate formed with the previous peak if plausible
    pub fn push(&mut self, peak: &PeakEvent) -> Option<BpmCandidate> {
        let previous = self.last_peak.replace(peak.frame_index)?;
        let bpm = interval_bpm(previous, peak.frame_index, self.hop_size, self.sample_rate)?;

        if bpm < self.min_bpm || bpm > self.max_bpm {
            log::trace!(
                "Dropping implausible interval {}->{} ({:.1} BPM)",
                previous,
                peak.frame_index,
                bpm
            );
            return None;
        }

        Some(BpmCandidate {
            bpm,
            from_frame: previous,
            to_frame: peak.frame_index,
        })
    }

    /// Forget the last peak
    pub fn reset(&mut self) {
        self.last_peak = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn peaks_at(indices: &[usize]) -> Vec<PeakEvent> {
        indices
            .iter()
            .map(|&frame_index| PeakEvent {
                frame_index,
                strength: 1.0,
            })
            .collect()
    }

    #[test]
    fn test_convert_regular_peaks() {
        // 43 frames * 512 / 44100 = 0.4992 s -> 120.19 BPM
        let peaks = peaks_at(&[10, 53, 96, 139]);
        let candidates = convert(&peaks, 512, 44100, 40.0, 220.0);
        assert_eq!(candidates.len(), 3);
        for c in &candidates {
            assert!((c.bpm - 120.19).abs() < 0.01, "got {}", c.bpm);
            assert_eq!(c.to_frame - c.from_frame, 43);
        }
    }

    #[test]
    fn test_convert_plausibility_band() {
        // 5 frames -> ~1033 BPM (too fast); 300 frames -> ~17 BPM (too slow)
        let peaks = peaks_at(&[0, 5, 48, 348]);
        let candidates = convert(&peaks, 512, 44100, 40.0, 220.0);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].from_frame, 5);
        assert_eq!(candidates[0].to_frame, 48);
    }

    #[test]
    fn test_convert_fewer_than_two_peaks() {
        assert!(convert(&[], 512, 44100, 40.0, 220.0).is_empty());
        assert!(convert(&peaks_at(&[12]), 512, 44100, 40.0, 220.0).is_empty());
    }

    #[test]
    fn test_tracker_spans_calls() {
        let mut tracker = IntervalTracker::new(512, 44100, 40.0, 220.0);
        let first = peaks_at(&[100]);
        let second = peaks_at(&[143]);
        assert!(tracker.push(&first[0]).is_none());
        let candidate = tracker.push(&second[0]).unwrap();
        assert_eq!(candidate.from_frame, 100);

        tracker.reset();
        assert!(tracker.push(&second[0]).is_none());
    }
}
