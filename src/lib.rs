//! # Stratum Tempo
//!
//! A tempo (BPM) estimation engine for raw PCM audio, producing a single stable value
//! for a static buffer or a continuously updated BPM series for a live stream.
//!
//! ## Features
//!
//! - **Single-shot analysis**: one estimate for a complete buffer
//! - **Streaming sessions**: chunk-by-chunk estimates with EMA smoothing
//! - **Monitor**: a session on a worker thread behind bounded channels
//! - **Segmented analysis**: a timestamped series over fixed-length segments, in parallel
//! - **Series tools**: statistics, CSV/JSON export, reference-vs-performance comparison
//!
//! ## Quick Start
//!
//! ```no_run
//! use stratum_tempo::{analyze, AnalysisConfig, SampleBuffer};
//!
//! // Mono PCM samples in [-1.0, 1.0]
//! let samples: Vec<f32> = vec![]; // Your audio data
//! let buffer = SampleBuffer::mono(samples, 44100);
//!
//! let estimate = analyze(&buffer, &AnalysisConfig::default())?;
//! match estimate.bpm {
//!     Some(bpm) => println!("BPM: {:.1}", bpm),
//!     None => println!("Tempo undetermined"),
//! }
//! # Ok::<(), stratum_tempo::AnalysisError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! PCM -> Frames -> Energy/ZCR -> Peak Detection -> Intervals -> IQR Filter -> Smoothing -> BPM
//! ```
//!
//! The stages live in [`features`] and [`analysis`]; [`analyzer`], [`session`] and
//! [`monitor`] compose them.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod analyzer;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod monitor;
pub mod preprocessing;
pub mod session;

// Re-export main types
pub use analysis::comparison::{compare, TempoComparison, TempoTrend};
pub use analysis::result::{BpmEstimate, BpmSeries, EstimateStatus, SeriesStats};
pub use analysis::smoothing::CentralTendency;
pub use analyzer::{analyze_segments, BpmAnalyzer};
pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use io::sample_buffer::SampleBuffer;
pub use monitor::{spawn_monitor, Monitor};
pub use preprocessing::channel_mixer::ChannelMixMode;
pub use session::TempoSession;

/// Estimate the tempo of a complete buffer
///
/// # Arguments
///
/// * `buffer` - Mono PCM buffer (use [`SampleBuffer::to_mono`] for multi-channel audio)
/// * `config` - Analysis configuration parameters
///
/// # Returns
///
/// `BpmEstimate` with the tempo, or `bpm == None` when no tempo could be determined
///
/// # Errors
///
/// Returns `AnalysisError` for an invalid configuration, invalid input, or a buffer
/// shorter than one frame
///
/// # Example
///
/// ```
/// use stratum_tempo::{analyze, AnalysisConfig, EstimateStatus, SampleBuffer};
///
/// let silence = SampleBuffer::mono(vec![0.0f32; 44100 * 5], 44100);
/// let estimate = analyze(&silence, &AnalysisConfig::default())?;
/// assert_eq!(estimate.status, EstimateStatus::NoPeaksDetected);
/// assert!(estimate.bpm.is_none());
/// # Ok::<(), stratum_tempo::AnalysisError>(())
/// ```
pub fn analyze(
    buffer: &SampleBuffer,
    config: &AnalysisConfig,
) -> Result<BpmEstimate, AnalysisError> {
    use std::time::Instant;
    let start_time = Instant::now();

    let estimate = BpmAnalyzer::new(config.clone())?.analyze(buffer)?;

    log::debug!(
        "Analysis of {:.2}s completed in {:.2} ms",
        buffer.duration_seconds(),
        start_time.elapsed().as_secs_f64() * 1000.0
    );
    Ok(estimate)
}

/// Open a streaming session
///
/// # Errors
///
/// Returns `AnalysisError::InvalidConfig` if the configuration is invalid
pub fn open_session(config: AnalysisConfig) -> Result<TempoSession, AnalysisError> {
    TempoSession::new(config)
}
