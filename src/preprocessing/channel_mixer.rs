//! Channel mixing utilities (multi-channel to mono conversion)

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Channel mixing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelMixMode {
    /// Arithmetic mean of all channels per sample frame
    Average,
    /// Sample from the channel with the largest magnitude in each sample frame
    Dominant,
}

/// Reduce interleaved samples to mono
///
/// # Arguments
///
/// * `interleaved` - Interleaved samples (`L R L R ...` for stereo)
/// * `channels` - Number of interleaved channels
/// * `mode` - Mixing mode
///
/// # Returns
///
/// Mono samples, one per complete sample frame. A trailing incomplete sample frame is
/// dropped.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if `channels` is zero
pub fn downmix(
    interleaved: &[f32],
    channels: usize,
    mode: ChannelMixMode,
) -> Result<Vec<f32>, AnalysisError> {
    if channels == 0 {
        return Err(AnalysisError::InvalidInput(
            "Channel count must be > 0".to_string(),
        ));
    }

    if channels == 1 {
        return Ok(interleaved.to_vec());
    }

    if interleaved.len() % channels != 0 {
        log::warn!(
            "Interleaved length {} is not a multiple of {} channels, dropping {} trailing samples",
            interleaved.len(),
            channels,
            interleaved.len() % channels
        );
    }

    log::debug!(
        "Downmixing {} samples from {} channels using {:?}",
        interleaved.len(),
        channels,
        mode
    );

    let inv = 1.0 / channels as f32;
    let mono = interleaved
        .chunks_exact(channels)
        .map(|frame| match mode {
            ChannelMixMode::Average => frame.iter().sum::<f32>() * inv,
            ChannelMixMode::Dominant => frame
                .iter()
                .copied()
                .fold(0.0f32, |best, s| if s.abs() > best.abs() { s } else { best }),
        })
        .collect();

    Ok(mono)
}

/// Convert separate left/right channels to mono
///
/// # Errors
///
/// Returns `AnalysisError::InvalidInput` if the channels differ in length
pub fn stereo_to_mono(
    left: &[f32],
    right: &[f32],
    mode: ChannelMixMode,
) -> Result<Vec<f32>, AnalysisError> {
    if left.len() != right.len() {
        return Err(AnalysisError::InvalidInput(format!(
            "Channel length mismatch: left={}, right={}",
            left.len(),
            right.len()
        )));
    }

    let mono = left
        .iter()
        .zip(right)
        .map(|(&l, &r)| match mode {
            ChannelMixMode::Average => (l + r) * 0.5,
            ChannelMixMode::Dominant => {
                if r.abs() > l.abs() {
                    r
                } else {
                    l
                }
            }
        })
        .collect();

    Ok(mono)
}
