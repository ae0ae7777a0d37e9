//! Single-shot tempo analysis
//!
//! Runs the full pipeline over one complete buffer:
//!
//! ```text
//! frames -> energy/ZCR (+ flux) -> adaptive-threshold peaks -> intervals -> IQR -> central tendency
//! ```
//!
//! [`analyze_segments`] applies the same analysis to consecutive fixed-length segments
//! in parallel and reports a timestamped series.

use rayon::prelude::*;

use crate::analysis::result::{BpmEstimate, BpmSeries, EstimateStatus};
use crate::analysis::smoothing::Smoother;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::extractor::FeatureExtractor;
use crate::features::frames::segment;
use crate::features::onset::peak_detector::PeakDetector;
use crate::features::period::bpm_values;
use crate::features::period::candidate_filter::filter_outliers;
use crate::features::period::intervals::convert;
use crate::io::sample_buffer::SampleBuffer;

/// Stateless single-shot analyzer
///
/// Holds a validated configuration; every call builds fresh stage state, so one
/// analyzer can be shared across threads.
#[derive(Debug, Clone)]
pub struct BpmAnalyzer {
    config: AnalysisConfig,
}

impl BpmAnalyzer {
    /// Create an analyzer
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidConfig` if the configuration is invalid
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Active configuration
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Estimate the tempo of a complete mono buffer
    ///
    /// # Arguments
    ///
    /// * `buffer` - Mono PCM buffer
    ///
    /// # Returns
    ///
    /// A `BpmEstimate`. A buffer without two usable peaks (e.g. silence) is not an error:
    /// it yields `EstimateStatus::NoPeaksDetected` with `bpm == None`.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a zero sample rate or multi-channel buffer
    /// - `InsufficientAudio` if the buffer is shorter than one frame
    pub fn analyze(&self, buffer: &SampleBuffer) -> Result<BpmEstimate, AnalysisError> {
        buffer.ensure_analyzable()?;
        self.analyze_samples(buffer.samples(), buffer.sample_rate())
    }

    fn analyze_samples(
        &self,
        samples: &[f32],
        sample_rate: u32,
    ) -> Result<BpmEstimate, AnalysisError> {
        let config = &self.config;
        if samples.len() < config.frame_size {
            return Err(AnalysisError::InsufficientAudio {
                samples: samples.len(),
                frame_size: config.frame_size,
            });
        }

        log::debug!(
            "Analyzing {} samples at {} Hz (frame={}, hop={})",
            samples.len(),
            sample_rate,
            config.frame_size,
            config.hop_size
        );

        let frames = segment(samples, config.frame_size, config.hop_size)?;
        let frame_total = frames.len();

        let mut extractor = FeatureExtractor::from_config(config);
        let mut detector = PeakDetector::from_config(config);
        let mut peaks = Vec::new();
        let mut zcr_sum = 0.0f64;
        let mut peak_strength = 0.0f32;

        for frame in frames {
            let features = extractor.process(&frame);
            zcr_sum += features.zcr as f64;
            let strength = extractor.onset_strength(&features);
            peak_strength = peak_strength.max(strength);
            if let Some(peak) = detector.push(strength) {
                peaks.push(peak);
            }
        }
        peaks.extend(detector.finish());

        let mean_zcr = (zcr_sum / frame_total as f64) as f32;
        log::debug!("Detected {} peaks over {} frames", peaks.len(), frame_total);

        let candidates = convert(
            &peaks,
            config.hop_size,
            sample_rate,
            config.min_bpm,
            config.max_bpm,
        );
        let accepted = filter_outliers(&candidates, config.k_iqr);
        let smoother = Smoother::new(config.central_tendency, config.alpha);

        let (bpm, status) = if candidates.is_empty() {
            if peak_strength > 0.0 {
                log::warn!(
                    "No usable tempo: {} peaks, no plausible intervals in a non-silent buffer",
                    peaks.len()
                );
            }
            (None, EstimateStatus::NoPeaksDetected)
        } else if accepted.is_empty() {
            log::warn!(
                "IQR filter rejected all {} candidates, using unfiltered pool",
                candidates.len()
            );
            (
                smoother.single_shot(&bpm_values(&candidates)),
                EstimateStatus::FilterFallback,
            )
        } else {
            (
                smoother.single_shot(&bpm_values(&accepted)),
                EstimateStatus::Determined,
            )
        };

        if let Some(bpm) = bpm {
            log::debug!(
                "Estimated {:.2} BPM from {}/{} candidates",
                bpm,
                accepted.len(),
                candidates.len()
            );
        }

        Ok(BpmEstimate {
            bpm,
            status,
            peak_count: peaks.len(),
            candidate_count: candidates.len(),
            accepted_count: accepted.len(),
            mean_zcr,
            timestamp_seconds: None,
        })
    }
}

/// Analyze consecutive fixed-length segments of a buffer independently
///
/// # Arguments
///
/// * `buffer` - Mono PCM buffer
/// * `config` - Analysis configuration
/// * `segment_seconds` - Segment length in seconds
///
/// # Returns
///
/// One point per segment, timestamped at the segment start. There are
/// `floor(len / segment_len)` non-overlapping segments (the remainder is dropped), or a
/// single whole-buffer segment when the buffer is shorter than one segment. A segment
/// too short for one frame becomes an undetermined point.
///
/// # Errors
///
/// - `InvalidConfig` for an invalid configuration or a non-positive segment length
/// - `InvalidInput` for a zero sample rate or multi-channel buffer
pub fn analyze_segments(
    buffer: &SampleBuffer,
    config: &AnalysisConfig,
    segment_seconds: f64,
) -> Result<BpmSeries, AnalysisError> {
    if !(segment_seconds.is_finite() && segment_seconds > 0.0) {
        return Err(AnalysisError::InvalidConfig(format!(
            "segment_seconds must be > 0, got {}",
            segment_seconds
        )));
    }
    let analyzer = BpmAnalyzer::new(config.clone())?;
    buffer.ensure_analyzable()?;

    let sample_rate = buffer.sample_rate();
    let samples = buffer.samples();
    let segment_len = ((segment_seconds * sample_rate as f64).round() as usize).max(1);
    let (count, segment_len) = if samples.len() < segment_len {
        (1, samples.len())
    } else {
        (samples.len() / segment_len, segment_len)
    };

    log::debug!(
        "Segmented analysis: {} segments of {} samples ({:.2}s)",
        count,
        segment_len,
        segment_seconds
    );

    let points = (0..count)
        .into_par_iter()
        .map(|i| {
            let start = i * segment_len;
            let timestamp = start as f64 / sample_rate as f64;
            match analyzer.analyze_samples(&samples[start..start + segment_len], sample_rate) {
                Ok(estimate) => Ok(estimate.with_timestamp(timestamp)),
                Err(AnalysisError::InsufficientAudio { .. }) => {
                    Ok(BpmEstimate::undetermined().with_timestamp(timestamp))
                }
                Err(e) => Err(e),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(points.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Decaying 60 Hz bursts every `period` samples
    fn pulse_train(period: usize, total: usize, sample_rate: u32) -> Vec<f32> {
        let burst = (0.1 * sample_rate as f32) as usize;
        (0..total)
            .map(|i| {
                let offset = i % period;
                if offset < burst {
                    let t = offset as f32 / sample_rate as f32;
                    0.8 * (2.0 * std::f32::consts::PI * 60.0 * t).sin() * (-30.0 * t).exp()
                } else {
                    0.0
                }
            })
            .collect()
    }

    fn config() -> AnalysisConfig {
        AnalysisConfig {
            frame_size: 1024,
            hop_size: 512,
            ..Default::default()
        }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = AnalysisConfig {
            hop_size: 4096,
            ..Default::default()
        };
        assert!(matches!(
            BpmAnalyzer::new(config),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_insufficient_audio() {
        let analyzer = BpmAnalyzer::new(config()).unwrap();
        let buffer = SampleBuffer::mono(vec![0.1; 1000], 44100);
        assert_eq!(
            analyzer.analyze(&buffer),
            Err(AnalysisError::InsufficientAudio {
                samples: 1000,
                frame_size: 1024
            })
        );
    }

    #[test]
    fn test_rejects_stereo() {
        let analyzer = BpmAnalyzer::new(config()).unwrap();
        let buffer = SampleBuffer::new(vec![0.0; 8192], 44100, 2);
        assert!(matches!(
            analyzer.analyze(&buffer),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_silence_is_undetermined() {
        let analyzer = BpmAnalyzer::new(config()).unwrap();
        let buffer = SampleBuffer::mono(vec![0.0; 44100 * 2], 44100);
        let estimate = analyzer.analyze(&buffer).unwrap();
        assert_eq!(estimate.bpm, None);
        assert_eq!(estimate.status, EstimateStatus::NoPeaksDetected);
        assert_eq!(estimate.peak_count, 0);
    }

    #[test]
    fn test_pulse_train_120_bpm() {
        let analyzer = BpmAnalyzer::new(config()).unwrap();
        let buffer = SampleBuffer::mono(pulse_train(22050, 44100 * 6, 44100), 44100);
        let estimate = analyzer.analyze(&buffer).unwrap();
        let bpm = estimate.bpm.expect("tempo should be determined");
        assert!((bpm - 120.0).abs() <= 2.0, "got {} BPM", bpm);
        assert_eq!(estimate.status, EstimateStatus::Determined);
        assert!(estimate.accepted_count <= estimate.candidate_count);
    }

    #[test]
    fn test_segments_timestamps() {
        let samples = pulse_train(22050, 44100 * 9, 44100);
        let buffer = SampleBuffer::mono(samples, 44100);
        let series = analyze_segments(&buffer, &config(), 3.0).unwrap();
        let times: Vec<f64> = series.pairs().iter().map(|(t, _)| *t).collect();
        assert_eq!(times, vec![0.0, 3.0, 6.0]);
        for point in series.iter() {
            let bpm = point.bpm.unwrap();
            assert!((bpm - 120.0).abs() <= 2.0, "got {} BPM", bpm);
        }
    }

    #[test]
    fn test_segments_short_buffer_single_segment() {
        let buffer = SampleBuffer::mono(vec![0.0; 44100], 44100);
        let series = analyze_segments(&buffer, &config(), 5.0).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.points()[0].timestamp_seconds, Some(0.0));
    }

    #[test]
    fn test_segments_too_short_for_frame() {
        let buffer = SampleBuffer::mono(vec![0.0; 500], 44100);
        let series = analyze_segments(&buffer, &config(), 5.0).unwrap();
        assert_eq!(series.len(), 1);
        assert!(!series.points()[0].is_determined());
    }

    #[test]
    fn test_segments_invalid_length() {
        let buffer = SampleBuffer::mono(vec![0.0; 44100], 44100);
        assert!(matches!(
            analyze_segments(&buffer, &config(), 0.0),
            Err(AnalysisError::InvalidConfig(_))
        ));
    }
}
