//! Analysis and result aggregation modules
//!
//! Turns BPM candidates into reported tempo values:
//! - Descriptive statistics (percentiles, means, deviation)
//! - Central tendency and streaming EMA smoothing
//! - Result and series types
//! - Series export and tempo comparison

pub mod comparison;
pub mod export;
pub mod result;
pub mod smoothing;
pub mod stats;
