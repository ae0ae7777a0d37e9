//! Configuration parameters for tempo analysis

use serde::{Deserialize, Serialize};

use crate::analysis::smoothing::CentralTendency;
use crate::error::AnalysisError;

/// Default analysis frame length in samples
pub const DEFAULT_FRAME_SIZE: usize = 2048;

/// Default hop between successive frames in samples
pub const DEFAULT_HOP_SIZE: usize = 512;

/// Default minimum distance between accepted peaks, in frames
///
/// About 0.23 s at 44.1 kHz / hop 512, just under one beat at 220 BPM.
pub const DEFAULT_MIN_PEAK_SEPARATION: usize = 20;

/// Default multiplier applied to the trailing mean to form the peak threshold
pub const DEFAULT_SENSITIVITY: f32 = 1.5;

/// Default trailing moving-average window for the adaptive threshold, in frames
///
/// About 1 s of frames at 44.1 kHz / hop 512.
pub const DEFAULT_THRESHOLD_WINDOW: usize = 86;

/// Default half-width of the local-maximum neighborhood, in frames
pub const DEFAULT_NEIGHBORHOOD: usize = 2;

/// Default IQR fence multiplier (Tukey's fence)
pub const DEFAULT_K_IQR: f32 = 1.5;

/// Default exponential smoothing factor for streaming estimates
pub const DEFAULT_ALPHA: f32 = 0.3;

/// Default lowest plausible tempo
pub const DEFAULT_MIN_BPM: f32 = 40.0;

/// Default highest plausible tempo
pub const DEFAULT_MAX_BPM: f32 = 220.0;

/// Default number of candidates kept in a session's rolling history
pub const DEFAULT_HISTORY_LEN: usize = 32;

/// Analysis configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    // Framing
    /// Frame size in samples (default: 2048)
    pub frame_size: usize,

    /// Hop size between frames in samples, `0 < hop_size <= frame_size` (default: 512)
    pub hop_size: usize,

    /// Divide frame energy by frame length (default: true)
    pub normalize_energy: bool,

    /// Weight of spectral flux in the onset strength, in [0, 1] (default: 0.0)
    ///
    /// 0.0 keeps the pipeline energy-only and skips the FFT entirely.
    pub spectral_flux_weight: f32,

    // Peak detection
    /// Minimum frames between accepted peaks (default: 20)
    pub min_peak_separation: usize,

    /// Threshold multiplier over the trailing mean onset strength (default: 1.5)
    pub sensitivity: f32,

    /// Trailing window of the adaptive threshold in frames (default: 86)
    pub threshold_window: usize,

    /// Local-maximum half-width in frames, at least 1 (default: 2)
    pub neighborhood: usize,

    // Candidates
    /// Minimum plausible BPM (default: 40.0)
    pub min_bpm: f32,

    /// Maximum plausible BPM (default: 220.0)
    pub max_bpm: f32,

    /// IQR fence multiplier (default: 1.5)
    pub k_iqr: f32,

    // Smoothing
    /// Central tendency used to collapse a candidate pool (default: median)
    pub central_tendency: CentralTendency,

    /// Streaming EMA factor in (0, 1] (default: 0.3)
    pub alpha: f32,

    /// Candidates retained by a streaming session for outlier fencing (default: 32)
    pub history_len: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            frame_size: DEFAULT_FRAME_SIZE,
            hop_size: DEFAULT_HOP_SIZE,
            normalize_energy: true,
            spectral_flux_weight: 0.0,
            min_peak_separation: DEFAULT_MIN_PEAK_SEPARATION,
            sensitivity: DEFAULT_SENSITIVITY,
            threshold_window: DEFAULT_THRESHOLD_WINDOW,
            neighborhood: DEFAULT_NEIGHBORHOOD,
            min_bpm: DEFAULT_MIN_BPM,
            max_bpm: DEFAULT_MAX_BPM,
            k_iqr: DEFAULT_K_IQR,
            central_tendency: CentralTendency::Median,
            alpha: DEFAULT_ALPHA,
            history_len: DEFAULT_HISTORY_LEN,
        }
    }
}

impl AnalysisConfig {
    /// Check every parameter, returning the first violation as `InvalidConfig`
    pub fn validate(&self) -> Result<(), AnalysisError> {
        fn invalid(msg: impl Into<String>) -> Result<(), AnalysisError> {
            Err(AnalysisError::InvalidConfig(msg.into()))
        }

        if self.frame_size == 0 {
            return invalid("frame_size must be > 0");
        }
        if self.hop_size == 0 {
            return invalid("hop_size must be > 0");
        }
        if self.hop_size > self.frame_size {
            return invalid(format!(
                "hop_size ({}) must not exceed frame_size ({})",
                self.hop_size, self.frame_size
            ));
        }
        if self.min_peak_separation == 0 {
            return invalid("min_peak_separation must be > 0");
        }
        if self.threshold_window == 0 {
            return invalid("threshold_window must be > 0");
        }
        if self.neighborhood == 0 {
            return invalid("neighborhood must be > 0");
        }
        if !(self.sensitivity.is_finite() && self.sensitivity > 0.0) {
            return invalid(format!("sensitivity must be > 0, got {}", self.sensitivity));
        }
        if !(self.min_bpm.is_finite() && self.min_bpm > 0.0) {
            return invalid(format!("min_bpm must be > 0, got {}", self.min_bpm));
        }
        if !self.max_bpm.is_finite() || self.min_bpm >= self.max_bpm {
            return invalid(format!(
                "min_bpm ({}) must be below max_bpm ({})",
                self.min_bpm, self.max_bpm
            ));
        }
        if !(self.k_iqr.is_finite() && self.k_iqr >= 0.0) {
            return invalid(format!("k_iqr must be >= 0, got {}", self.k_iqr));
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return invalid(format!("alpha must be in (0, 1], got {}", self.alpha));
        }
        if !(0.0..=1.0).contains(&self.spectral_flux_weight) {
            return invalid(format!(
                "spectral_flux_weight must be in [0, 1], got {}",
                self.spectral_flux_weight
            ));
        }
        if self.history_len == 0 {
            return invalid("history_len must be > 0");
        }
        self.central_tendency.validate()
    }

    /// Parse a configuration from JSON, filling missing fields with defaults
    pub fn from_json_str(json: &str) -> Result<Self, AnalysisError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| AnalysisError::InvalidConfig(format!("Malformed config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns the serializer error (e.g. a non-finite float field)
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(AnalysisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_sizes() {
        let config = AnalysisConfig {
            frame_size: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AnalysisError::InvalidConfig(_))));

        let config = AnalysisConfig {
            hop_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AnalysisConfig {
            frame_size: 512,
            hop_size: 1024,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AnalysisConfig {
            neighborhood: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AnalysisError::InvalidConfig(_))));
    }

    #[test]
    fn test_invalid_bpm_range() {
        let config = AnalysisConfig {
            min_bpm: 120.0,
            max_bpm: 120.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AnalysisConfig {
            min_bpm: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_alpha() {
        for alpha in [0.0, -0.5, 1.5, f32::NAN] {
            let config = AnalysisConfig {
                alpha,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "alpha {} should be rejected", alpha);
        }
        let config = AnalysisConfig {
            alpha: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_json_partial_config_uses_defaults() {
        let config = AnalysisConfig::from_json_str(r#"{"frame_size": 1024, "alpha": 0.5}"#).unwrap();
        assert_eq!(config.frame_size, 1024);
        assert_eq!(config.alpha, 0.5);
        assert_eq!(config.hop_size, DEFAULT_HOP_SIZE);
        assert_eq!(config.k_iqr, DEFAULT_K_IQR);
    }

    #[test]
    fn test_json_roundtrip_and_rejection() {
        let config = AnalysisConfig {
            central_tendency: CentralTendency::TrimmedMean { proportion: 0.1 },
            ..Default::default()
        };
        let parsed = AnalysisConfig::from_json_str(&config.to_json_string().unwrap()).unwrap();
        assert_eq!(parsed, config);

        assert!(AnalysisConfig::from_json_str(r#"{"hop_size": 0}"#).is_err());
        assert!(AnalysisConfig::from_json_str("not json").is_err());
    }
}
