//! PCM sample buffers handed to the analyzer

use crate::error::AnalysisError;
use crate::preprocessing::channel_mixer::{downmix, ChannelMixMode};

/// Scale factor mapping signed 16-bit PCM onto [-1.0, 1.0)
const I16_SCALE: f32 = 1.0 / 32768.0;

/// Decoded PCM audio tagged with its sample rate and channel count
///
/// Samples are interleaved when `channels > 1`. The analyzer only accepts mono
/// buffers; use [`SampleBuffer::to_mono`] to reduce multi-channel audio first.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl SampleBuffer {
    /// Create a buffer from floating-point samples
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    /// Create a mono buffer from floating-point samples
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self::new(samples, sample_rate, 1)
    }

    /// Create a buffer from signed 16-bit PCM, scaled to [-1.0, 1.0)
    pub fn from_i16(samples: &[i16], sample_rate: u32, channels: u16) -> Self {
        let samples = samples.iter().map(|&s| s as f32 * I16_SCALE).collect();
        Self::new(samples, sample_rate, channels)
    }

    /// Interleaved samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of interleaved channels
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Total number of samples (all channels)
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when the buffer holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds, or 0.0 for a zero sample rate
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.channels as f64 / self.sample_rate as f64
    }

    /// Reduce to a mono buffer with the given mixing mode
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::InvalidInput` if the channel count is zero
    pub fn to_mono(&self, mode: ChannelMixMode) -> Result<SampleBuffer, AnalysisError> {
        let mono = downmix(&self.samples, self.channels as usize, mode)?;
        Ok(SampleBuffer::mono(mono, self.sample_rate))
    }

    /// Check the buffer can enter the analysis pipeline
    pub(crate) fn ensure_analyzable(&self) -> Result<(), AnalysisError> {
        if self.sample_rate == 0 {
            return Err(AnalysisError::InvalidInput(
                "Invalid sample rate: 0 Hz".to_string(),
            ));
        }
        if self.channels != 1 {
            return Err(AnalysisError::InvalidInput(format!(
                "Expected mono audio, got {} channels (downmix with SampleBuffer::to_mono)",
                self.channels
            )));
        }
        Ok(())
    }
}
