//! Incremental (streaming) tempo analysis
//!
//! A [`TempoSession`] accepts consecutive PCM chunks and returns an updated estimate per
//! chunk. Frames that straddle chunk boundaries are completed from a carried sample tail,
//! and frame indices are global across the session, so peaks and intervals are identical
//! to those of the concatenated stream.
//!
//! Per chunk:
//! 1. frame the pending samples and run the peak detector
//! 2. convert new peaks to candidates (the interval tracker spans chunks)
//! 3. fence the chunk's candidates with IQR bounds computed over the rolling history
//! 4. blend the chunk's central tendency into the running estimate (EMA)

use std::collections::VecDeque;

use crate::analysis::result::{BpmEstimate, BpmSeries, EstimateStatus};
use crate::analysis::smoothing::Smoother;
use crate::config::AnalysisConfig;
use crate::error::AnalysisError;
use crate::features::extractor::FeatureExtractor;
use crate::features::frames::segment;
use crate::features::onset::peak_detector::PeakDetector;
use crate::features::period::bpm_values;
use crate::features::period::candidate_filter::{iqr_fences, within_fences};
use crate::features::period::intervals::IntervalTracker;
use crate::features::period::BpmCandidate;
use crate::io::sample_buffer::SampleBuffer;

/// Stateful streaming analyzer
///
/// All mutable state lives here; `feed` takes `&mut self`, so one session has exactly
/// one writer. Independent sessions share nothing.
#[derive(Debug)]
pub struct TempoSession {
    config: AnalysisConfig,
    smoother: Smoother,
    /// Fixed by the first accepted chunk
    sample_rate: Option<u32>,
    /// Samples not yet consumed by a complete frame
    pending: Vec<f32>,
    extractor: FeatureExtractor,
    detector: PeakDetector,
    tracker: Option<IntervalTracker>,
    /// Most recent candidate BPMs, at most `history_len`
    history: VecDeque<f32>,
    estimate: Option<f32>,
    series: BpmSeries,
    elapsed_samples: u64,
}

impl TempoSession {
    /// Open a session
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidConfig` if the configuration is invalid
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self {
            smoother: Smoother::new(config.central_tendency, config.alpha),
            sample_rate: None,
            pending: Vec::with_capacity(config.frame_size * 2),
            extractor: FeatureExtractor::from_config(&config),
            detector: PeakDetector::from_config(&config),
            tracker: None,
            history: VecDeque::with_capacity(config.history_len),
            estimate: None,
            series: BpmSeries::new(),
            elapsed_samples: 0,
            config,
        })
    }

    /// Feed the next chunk of mono audio
    ///
    /// # Arguments
    ///
    /// * `chunk` - Next chunk; must share the sample rate of earlier chunks
    ///
    /// # Returns
    ///
    /// The updated estimate, timestamped at the end of the chunk, which is also appended
    /// to the session series. A chunk without usable candidates carries the previous
    /// estimate forward (`EstimateStatus::CarriedForward`).
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for a zero sample rate, a multi-channel chunk, or a sample rate
    ///   different from the session's (the chunk is ignored)
    /// - `InsufficientAudio` while the pending samples are still shorter than one frame;
    ///   the samples are kept and count toward the next chunk
    pub fn feed(&mut self, chunk: &SampleBuffer) -> Result<BpmEstimate, AnalysisError> {
        chunk.ensure_analyzable()?;
        let sample_rate = chunk.sample_rate();
        match self.sample_rate {
            Some(rate) if rate != sample_rate => {
                return Err(AnalysisError::InvalidInput(format!(
                    "Chunk sample rate {} Hz differs from session rate {} Hz",
                    sample_rate, rate
                )));
            }
            Some(_) => {}
            None => {
                self.sample_rate = Some(sample_rate);
                log::debug!("Session started at {} Hz", sample_rate);
            }
        }

        self.pending.extend_from_slice(chunk.samples());
        self.elapsed_samples += chunk.len() as u64;

        let frame_size = self.config.frame_size;
        let hop_size = self.config.hop_size;
        if self.pending.len() < frame_size {
            return Err(AnalysisError::InsufficientAudio {
                samples: self.pending.len(),
                frame_size,
            });
        }

        let frames = segment(&self.pending, frame_size, hop_size)?;
        let frame_total = frames.len();
        let mut peaks = Vec::new();
        let mut zcr_sum = 0.0f64;
        for frame in frames {
            let features = self.extractor.process(&frame);
            zcr_sum += features.zcr as f64;
            if let Some(peak) = self.detector.push(self.extractor.onset_strength(&features)) {
                peaks.push(peak);
            }
        }
        // Keep the tail from the first sample of the next frame onward
        self.pending.drain(..frame_total * hop_size);

        let config = &self.config;
        let tracker = self.tracker.get_or_insert_with(|| {
            IntervalTracker::new(hop_size, sample_rate, config.min_bpm, config.max_bpm)
        });
        let candidates: Vec<BpmCandidate> = peaks.iter().filter_map(|p| tracker.push(p)).collect();

        for candidate in &candidates {
            if self.history.len() == config.history_len {
                self.history.pop_front();
            }
            self.history.push_back(candidate.bpm);
        }

        let history: Vec<f32> = self.history.iter().copied().collect();
        let accepted = match iqr_fences(&history, config.k_iqr) {
            Some(fences) => within_fences(&candidates, fences),
            None => candidates.clone(),
        };

        let (pool, status) = if candidates.is_empty() {
            let status = if self.estimate.is_some() {
                EstimateStatus::CarriedForward
            } else {
                EstimateStatus::NoPeaksDetected
            };
            (Vec::new(), status)
        } else if accepted.is_empty() {
            log::warn!(
                "All {} chunk candidates outside history fences, using unfiltered chunk",
                candidates.len()
            );
            (bpm_values(&candidates), EstimateStatus::FilterFallback)
        } else {
            (bpm_values(&accepted), EstimateStatus::Determined)
        };

        self.estimate = self.smoother.update(&pool, self.estimate);

        let estimate = BpmEstimate {
            bpm: self.estimate,
            status,
            peak_count: peaks.len(),
            candidate_count: candidates.len(),
            accepted_count: accepted.len(),
            mean_zcr: (zcr_sum / frame_total as f64) as f32,
            timestamp_seconds: Some(self.elapsed_samples as f64 / sample_rate as f64),
        };

        log::debug!(
            "Chunk {}: {} frames, {} peaks, {}/{} candidates accepted, estimate {:?}",
            self.series.len(),
            frame_total,
            estimate.peak_count,
            estimate.accepted_count,
            estimate.candidate_count,
            estimate.bpm
        );

        self.series.push(estimate.clone());
        Ok(estimate)
    }

    /// Clear all accumulated state and the series, keeping the configuration
    pub fn reset(&mut self) {
        self.sample_rate = None;
        self.pending.clear();
        self.extractor.reset();
        self.detector.reset();
        self.tracker = None;
        self.history.clear();
        self.estimate = None;
        self.series.clear();
        self.elapsed_samples = 0;
    }

    /// Current smoothed estimate
    pub fn current(&self) -> Option<f32> {
        self.estimate
    }

    /// Estimates produced so far
    pub fn series(&self) -> &BpmSeries {
        &self.series
    }

    /// Active configuration
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Seconds of audio fed so far (0 before the first chunk)
    pub fn elapsed_seconds(&self) -> f64 {
        match self.sample_rate {
            Some(rate) => self.elapsed_samples as f64 / rate as f64,
            None => 0.0,
        }
    }

    /// End the session, releasing its state and returning the series
    pub fn close(self) -> BpmSeries {
        log::debug!(
            "Session closed after {:.2}s, {} estimates",
            self.elapsed_seconds(),
            self.series.len()
        );
        self.series
    }
}
