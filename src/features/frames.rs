//! Frame segmentation
//!
//! Slices a sample slice into fixed-length, optionally overlapping analysis frames.
//! Frames borrow the underlying samples; nothing is copied. The trailing remainder
//! shorter than `frame_size` is discarded.
//!
//! # Example
//!
//! ```
//! use stratum_tempo::features::frames::segment;
//!
//! let samples = vec![0.0f32; 4096];
//! let frames = segment(&samples, 1024, 512)?;
//! assert_eq!(frames.len(), 7);
//! # Ok::<(), stratum_tempo::AnalysisError>(())
//! ```

use crate::error::AnalysisError;

/// A borrowed analysis window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame<'a> {
    /// Frame index (position in the frame sequence)
    pub index: usize,
    /// Offset of the first sample in the source slice
    pub start: usize,
    /// Samples covered by this frame (`frame_size` long)
    pub samples: &'a [f32],
}

/// Number of complete frames in a slice of `len` samples
///
/// `floor((len - frame_size) / hop_size) + 1` when `len >= frame_size`, else 0.
/// A zero `frame_size` or `hop_size` yields 0.
pub fn frame_count(len: usize, frame_size: usize, hop_size: usize) -> usize {
    if frame_size == 0 || hop_size == 0 || len < frame_size {
        0
    } else {
        (len - frame_size) / hop_size + 1
    }
}

/// Lazy sequence of frames over a sample slice
///
/// A clone snapshots the current position, so a clone taken before iterating
/// replays the same frames.
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    samples: &'a [f32],
    frame_size: usize,
    hop_size: usize,
    next: usize,
    count: usize,
}

impl<'a> Iterator for Frames<'a> {
    type Item = Frame<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let index = self.next;
        let start = index * self.hop_size;
        self.next += 1;
        Some(Frame {
            index,
            start,
            samples: &self.samples[start..start + self.frame_size],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Frames<'_> {}

/// Segment samples into frames
///
/// # Arguments
///
/// * `samples` - Mono samples
/// * `frame_size` - Frame length in samples (> 0)
/// * `hop_size` - Stride between frame starts (`0 < hop_size <= frame_size`)
///
/// # Errors
///
/// Returns `AnalysisError::InvalidConfig` for a zero frame or hop size, or a hop size
/// larger than the frame size
pub fn segment(
    samples: &[f32],
    frame_size: usize,
    hop_size: usize,
) -> Result<Frames<'_>, AnalysisError> {
    if frame_size == 0 {
        return Err(AnalysisError::InvalidConfig(
            "Frame size must be > 0".to_string(),
        ));
    }

    if hop_size == 0 {
        return Err(AnalysisError::InvalidConfig(
            "Hop size must be > 0".to_string(),
        ));
    }

    if hop_size > frame_size {
        return Err(AnalysisError::InvalidConfig(format!(
            "Hop size ({}) must not exceed frame size ({})",
            hop_size, frame_size
        )));
    }

    Ok(Frames {
        samples,
        frame_size,
        hop_size,
        next: 0,
        count: frame_count(samples.len(), frame_size, hop_size),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_count_formula() {
        for &(len, frame, hop) in &[
            (4096, 1024, 512),
            (4095, 1024, 512),
            (1024, 1024, 512),
            (44100, 2048, 512),
            (10_000, 1000, 1000),
            (10_001, 1000, 333),
        ] {
            let samples = vec![0.0f32; len];
            let frames = segment(&samples, frame, hop).unwrap();
            let expected = (len - frame) / hop + 1;
            assert_eq!(frames.len(), expected, "len={} frame={} hop={}", len, frame, hop);
            assert_eq!(frames.count(), expected);
        }
    }

    #[test]
    fn test_frame_count_degenerate_sizes() {
        assert_eq!(frame_count(4096, 1024, 0), 0);
        assert_eq!(frame_count(4096, 0, 512), 0);
        assert_eq!(frame_count(1000, 1024, 512), 0);
    }

    #[test]
    fn test_shorter_than_frame_yields_nothing() {
        let samples = vec![0.5f32; 1000];
        let frames = segment(&samples, 1024, 512).unwrap();
        assert_eq!(frames.len(), 0);
    }

    #[test]
    fn test_frames_are_ordered_views() {
        let samples: Vec<f32> = (0..10).map(|i| i as f32).collect();
        let frames: Vec<_> = segment(&samples, 4, 3).unwrap().collect();

        // 10 samples, frame 4, hop 3 -> starts 0, 3, 6; remainder (9) dropped
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].samples, &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(frames[1].start, 3);
        assert_eq!(frames[2].samples, &[6.0, 7.0, 8.0, 9.0]);
        assert!(frames.windows(2).all(|w| w[0].index + 1 == w[1].index));
    }

    #[test]
    fn test_restartable() {
        let samples = vec![0.1f32; 5000];
        let frames = segment(&samples, 1024, 256).unwrap();
        let first: Vec<usize> = frames.clone().map(|f| f.start).collect();
        let second: Vec<usize> = frames.map(|f| f.start).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_parameters() {
        let samples = vec![0.0f32; 100];
        assert!(matches!(
            segment(&samples, 0, 1),
            Err(AnalysisError::InvalidConfig(_))
        ));
        assert!(segment(&samples, 10, 0).is_err());
        assert!(segment(&samples, 10, 11).is_err());
    }
}
