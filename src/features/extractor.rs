//! Per-frame feature extraction
//!
//! Computes short-time energy and zero-crossing rate for each frame. Sums are
//! accumulated in `f64` so long frames of full-scale 16-bit audio cannot lose
//! precision or overflow.

use super::frames::Frame;
use super::spectral_flux::SpectralFlux;
use crate::config::AnalysisConfig;

/// Features of one analysis frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeatureVector {
    /// Short-time energy (non-negative)
    pub energy: f32,
    /// Zero-crossing rate: sign changes / frame length
    pub zcr: f32,
    /// Positive spectral flux relative to the previous frame (0 when not computed)
    pub flux: f32,
}

impl FeatureVector {
    /// Onset strength scanned by the peak detector
    ///
    /// `(1 - w) * energy + w * flux`; with `w = 0` this is the energy itself.
    pub fn onset_strength(&self, flux_weight: f32) -> f32 {
        if flux_weight <= 0.0 {
            self.energy
        } else {
            (1.0 - flux_weight) * self.energy + flux_weight * self.flux
        }
    }
}

/// Short-time energy of a sample window
///
/// Sum of squared samples, divided by the window length when `normalize` is set.
/// An empty window has zero energy.
pub fn short_time_energy(samples: &[f32], normalize: bool) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|&x| (x as f64) * (x as f64)).sum();
    if normalize {
        (sum_sq / samples.len() as f64) as f32
    } else {
        sum_sq as f32
    }
}

/// Zero-crossing rate of a sample window
///
/// Counts adjacent pairs on opposite sides of zero (negative vs non-negative) and
/// divides by the window length. Constant windows have a rate of 0.
pub fn zero_crossing_rate(samples: &[f32]) -> f32 {
    if samples.len() < 2 {
        return 0.0;
    }
    let crossings = samples
        .windows(2)
        .filter(|w| (w[0] < 0.0) != (w[1] < 0.0))
        .count();
    crossings as f32 / samples.len() as f32
}

/// Extract energy and ZCR for one frame
pub fn extract(frame: &Frame<'_>, normalize_energy: bool) -> FeatureVector {
    FeatureVector {
        energy: short_time_energy(frame.samples, normalize_energy),
        zcr: zero_crossing_rate(frame.samples),
        flux: 0.0,
    }
}

/// Stateful extractor owning the optional spectral-flux tracker
///
/// Frames must be fed in order; the flux of each frame depends on the previous one.
#[derive(Debug)]
pub struct FeatureExtractor {
    normalize_energy: bool,
    flux_weight: f32,
    flux: Option<SpectralFlux>,
}

impl FeatureExtractor {
    /// Create an extractor; the FFT is only planned when flux is blended in
    pub fn from_config(config: &AnalysisConfig) -> Self {
        let flux = (config.spectral_flux_weight > 0.0).then(|| SpectralFlux::new(config.frame_size));
        Self {
            normalize_energy: config.normalize_energy,
            flux_weight: config.spectral_flux_weight,
            flux,
        }
    }

    /// Extract the features of the next frame
    pub fn process(&mut self, frame: &Frame<'_>) -> FeatureVector {
        let mut features = extract(frame, self.normalize_energy);
        if let Some(flux) = self.flux.as_mut() {
            features.flux = flux.process(frame.samples);
        }
        features
    }

    /// Onset strength of a feature vector under this extractor's blend weight
    pub fn onset_strength(&self, features: &FeatureVector) -> f32 {
        features.onset_strength(self.flux_weight)
    }

    /// Forget inter-frame state
    pub fn reset(&mut self) {
        if let Some(flux) = self.flux.as_mut() {
            flux.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::frames::segment;

    #[test]
    fn test_silent_frame_has_zero_energy() {
        let samples = vec![0.0f32; 1024];
        let frame = segment(&samples, 1024, 512).unwrap().next().unwrap();
        let features = extract(&frame, true);
        assert_eq!(features.energy, 0.0);
        assert_eq!(features.zcr, 0.0);
    }

    #[test]
    fn test_constant_frame_has_zero_zcr() {
        assert_eq!(zero_crossing_rate(&[0.7f32; 512]), 0.0);
        assert_eq!(zero_crossing_rate(&[-0.3f32; 512]), 0.0);
    }

    #[test]
    fn test_alternating_signal_zcr() {
        let samples: Vec<f32> = (0..100).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        // 99 crossings over 100 samples
        assert!((zero_crossing_rate(&samples) - 0.99).abs() < 1e-6);
    }

    #[test]
    fn test_energy_normalization() {
        let samples = vec![0.5f32; 100];
        assert!((short_time_energy(&samples, false) - 25.0).abs() < 1e-4);
        assert!((short_time_energy(&samples, true) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_energy_full_scale_i16_range() {
        // Raw 16-bit magnitudes summed over a long frame must not overflow
        let samples = vec![32767.0f32; 65536];
        let energy = short_time_energy(&samples, false);
        assert!(energy.is_finite());
        assert!(energy > 7.0e13);
    }

    #[test]
    fn test_extractor_flux_disabled_by_default() {
        let config = AnalysisConfig {
            frame_size: 256,
            hop_size: 128,
            ..Default::default()
        };
        let mut extractor = FeatureExtractor::from_config(&config);
        let samples: Vec<f32> = (0..1024).map(|i| ((i % 7) as f32 - 3.0) * 0.1).collect();
        for frame in segment(&samples, 256, 128).unwrap() {
            let features = extractor.process(&frame);
            assert_eq!(features.flux, 0.0);
            assert_eq!(extractor.onset_strength(&features), features.energy);
        }
    }

    #[test]
    fn test_extractor_flux_enabled() {
        let config = AnalysisConfig {
            frame_size: 256,
            hop_size: 256,
            spectral_flux_weight: 0.5,
            ..Default::default()
        };
        let mut extractor = FeatureExtractor::from_config(&config);
        let mut samples = vec![0.0f32; 256];
        samples.extend((0..256).map(|i| (i as f32 * 0.3).sin() * 0.5));
        let features: Vec<FeatureVector> = segment(&samples, 256, 256)
            .unwrap()
            .map(|f| extractor.process(&f))
            .collect();
        assert_eq!(features[0].flux, 0.0);
        assert!(features[1].flux > 0.0);
    }

    #[test]
    fn test_onset_strength_blend() {
        let features = FeatureVector {
            energy: 1.0,
            zcr: 0.1,
            flux: 3.0,
        };
        assert_eq!(features.onset_strength(0.0), 1.0);
        assert!((features.onset_strength(0.5) - 2.0).abs() < 1e-6);
        assert_eq!(features.onset_strength(1.0), 3.0);
    }
}
