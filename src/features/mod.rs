//! Feature extraction modules
//!
//! This module contains the per-stage algorithms of the tempo pipeline:
//! - Frame segmentation
//! - Short-time energy, zero-crossing rate and optional spectral flux
//! - Onset (peak) detection
//! - Period estimation (interval to BPM, outlier filtering)

pub mod extractor;
pub mod frames;
pub mod onset;
pub mod period;
pub mod spectral_flux;
