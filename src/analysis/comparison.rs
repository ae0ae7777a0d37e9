//! Reference-vs-performance tempo comparison
//!
//! Compares a performance series (e.g. a live take analyzed in a session) against a
//! reference series (e.g. the segmented analysis of a recording):
//! - Speed: absolute and percent difference of the mean performance tempo
//! - Stability: `100 - min(100, 10 * std_dev)` of the performance tempo
//! - Consistency: share of performance points within 2 %, 5 % and 10 % of the reference
//! - Trend: mean of the last third against the first third of the performance

use serde::{Deserialize, Serialize};

use super::result::BpmSeries;
use super::stats;

/// Relative change between first and last thirds that counts as a trend, in percent
pub const TREND_THRESHOLD_PERCENT: f32 = 5.0;

/// Tempo drift over the performance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "percent", rename_all = "snake_case")]
pub enum TempoTrend {
    /// Last third faster than the first by the given percentage
    SpeedingUp(f32),
    /// Last third slower than the first by the given percentage
    SlowingDown(f32),
    /// Within the trend threshold
    Consistent,
    /// Fewer than three points, or an empty third
    InsufficientData,
}

/// Outcome of comparing a performance against a reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TempoComparison {
    /// Mean tempo of the reference's determined points
    pub reference_bpm: f32,
    /// Mean tempo of the performance
    pub mean_bpm: f32,
    /// Median tempo of the performance
    pub median_bpm: f32,
    /// `|mean_bpm - reference_bpm|`
    pub bpm_diff: f32,
    /// `bpm_diff` as a percentage of the reference
    pub percent_diff: f32,
    /// 0-100, higher is steadier
    pub stability_score: f32,
    /// Percent of points within 2 % of the reference
    pub within_2_percent: f32,
    /// Percent of points within 5 % of the reference
    pub within_5_percent: f32,
    /// Percent of points within 10 % of the reference
    pub within_10_percent: f32,
    /// Drift over the performance
    pub trend: TempoTrend,
}

fn share_within(values: &[f32], reference: f32, percent: f32) -> f32 {
    let hits = values
        .iter()
        .filter(|&&v| (v - reference).abs() / reference * 100.0 <= percent)
        .count();
    hits as f32 / values.len() as f32 * 100.0
}

fn trend(values: &[f32]) -> TempoTrend {
    if values.len() < 3 {
        return TempoTrend::InsufficientData;
    }
    let third = values.len() / 3;
    let (Some(first), Some(last)) = (
        stats::mean(&values[..third]),
        stats::mean(&values[2 * third..]),
    ) else {
        return TempoTrend::InsufficientData;
    };
    if first <= 0.0 {
        return TempoTrend::InsufficientData;
    }

    let change = (last - first) / first * 100.0;
    if change > TREND_THRESHOLD_PERCENT {
        TempoTrend::SpeedingUp(change)
    } else if change < -TREND_THRESHOLD_PERCENT {
        TempoTrend::SlowingDown(-change)
    } else {
        TempoTrend::Consistent
    }
}

/// Compare a performance series against a reference series
///
/// Only determined points count. Returns `None` when either series has none.
pub fn compare(reference: &BpmSeries, performance: &BpmSeries) -> Option<TempoComparison> {
    let reference_bpm = stats::mean(&reference.determined_bpms())?;
    if reference_bpm <= 0.0 {
        return None;
    }

    let values = performance.determined_bpms();
    let mean_bpm = stats::mean(&values)?;
    let median_bpm = stats::median(&values)?;
    let std_dev = stats::std_dev(&values)?;

    let bpm_diff = (mean_bpm - reference_bpm).abs();
    let comparison = TempoComparison {
        reference_bpm,
        mean_bpm,
        median_bpm,
        bpm_diff,
        percent_diff: bpm_diff / reference_bpm * 100.0,
        stability_score: 100.0 - (std_dev * 10.0).min(100.0),
        within_2_percent: share_within(&values, reference_bpm, 2.0),
        within_5_percent: share_within(&values, reference_bpm, 5.0),
        within_10_percent: share_within(&values, reference_bpm, 10.0),
        trend: trend(&values),
    };

    log::debug!(
        "Tempo comparison: reference={:.1}, performance={:.1} ({:.1}% off), stability={:.0}",
        comparison.reference_bpm,
        comparison.mean_bpm,
        comparison.percent_diff,
        comparison.stability_score
    );

    Some(comparison)
}
