//! Analysis result types

use serde::{Deserialize, Serialize};

use super::stats;

/// How an estimate was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateStatus {
    /// Derived from the IQR-filtered candidate pool
    Determined,
    /// Every candidate was fenced out; the pre-filter pool's central tendency was used
    FilterFallback,
    /// Streaming chunk without usable candidates; the previous estimate was kept
    CarriedForward,
    /// Fewer than two usable peaks and no previous estimate: tempo undetermined
    NoPeaksDetected,
}

/// A tempo estimate
///
/// `bpm` is `None` when the tempo is undetermined, which keeps it distinct from any
/// real (even very slow) tempo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BpmEstimate {
    /// Estimated tempo, `None` when undetermined
    pub bpm: Option<f32>,

    /// How the estimate was reached
    pub status: EstimateStatus,

    /// Peaks detected in this analysis pass (or chunk)
    pub peak_count: usize,

    /// Candidates inside the plausibility band
    pub candidate_count: usize,

    /// Candidates that survived outlier filtering
    pub accepted_count: usize,

    /// Mean zero-crossing rate of the analyzed frames
    pub mean_zcr: f32,

    /// Seconds from session or buffer start (streaming and segmented modes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_seconds: Option<f64>,
}

impl BpmEstimate {
    /// An undetermined estimate
    pub fn undetermined() -> Self {
        Self {
            bpm: None,
            status: EstimateStatus::NoPeaksDetected,
            peak_count: 0,
            candidate_count: 0,
            accepted_count: 0,
            mean_zcr: 0.0,
            timestamp_seconds: None,
        }
    }

    /// True when a tempo value is available
    pub fn is_determined(&self) -> bool {
        self.bpm.is_some()
    }

    /// Tempo for display, with 0.0 standing in for "undetermined"
    pub fn bpm_or_zero(&self) -> f32 {
        self.bpm.unwrap_or(0.0)
    }

    /// Attach a timestamp
    pub fn with_timestamp(mut self, seconds: f64) -> Self {
        self.timestamp_seconds = Some(seconds);
        self
    }
}

/// Summary statistics of the determined points of a series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    /// Number of determined points
    pub count: usize,
    /// Mean BPM
    pub mean: f32,
    /// Lowest BPM
    pub min: f32,
    /// Highest BPM
    pub max: f32,
    /// Population standard deviation
    pub std_dev: f32,
}

/// Time-ordered series of estimates
///
/// Append-only while a session runs; cleared on session reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BpmSeries {
    points: Vec<BpmEstimate>,
}

impl BpmSeries {
    /// Empty series
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an estimate
    pub fn push(&mut self, estimate: BpmEstimate) {
        self.points.push(estimate);
    }

    /// All points in order
    pub fn points(&self) -> &[BpmEstimate] {
        &self.points
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the series has no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Remove every point
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Most recent point
    pub fn last(&self) -> Option<&BpmEstimate> {
        self.points.last()
    }

    /// Iterate over the points
    pub fn iter(&self) -> std::slice::Iter<'_, BpmEstimate> {
        self.points.iter()
    }

    /// `(timestamp, bpm)` pairs; untimed points report 0.0 s
    pub fn pairs(&self) -> Vec<(f64, Option<f32>)> {
        self.points
            .iter()
            .map(|p| (p.timestamp_seconds.unwrap_or(0.0), p.bpm))
            .collect()
    }

    /// BPM values of the determined points
    pub fn determined_bpms(&self) -> Vec<f32> {
        self.points.iter().filter_map(|p| p.bpm).collect()
    }

    /// Points with a timestamp at or after `seconds` (untimed points are kept)
    pub fn since(&self, seconds: f64) -> BpmSeries {
        self.points
            .iter()
            .filter(|p| p.timestamp_seconds.map_or(true, |t| t >= seconds))
            .cloned()
            .collect()
    }

    /// Statistics over determined points, `None` if there are none
    pub fn stats(&self) -> Option<SeriesStats> {
        let values = self.determined_bpms();
        let mean = stats::mean(&values)?;
        let min = values.iter().copied().fold(f32::INFINITY, f32::min);
        let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        Some(SeriesStats {
            count: values.len(),
            mean,
            min,
            max,
            std_dev: stats::std_dev(&values)?,
        })
    }
}

impl FromIterator<BpmEstimate> for BpmSeries {
    fn from_iter<I: IntoIterator<Item = BpmEstimate>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a BpmSeries {
    type Item = &'a BpmEstimate;
    type IntoIter = std::slice::Iter<'a, BpmEstimate>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(t: f64, bpm: Option<f32>) -> BpmEstimate {
        BpmEstimate {
            bpm,
            status: if bpm.is_some() {
                EstimateStatus::Determined
            } else {
                EstimateStatus::NoPeaksDetected
            },
            ..BpmEstimate::undetermined()
        }
        .with_timestamp(t)
    }

    #[test]
    fn test_undetermined_sentinel() {
        let estimate = BpmEstimate::undetermined();
        assert!(!estimate.is_determined());
        assert_eq!(estimate.bpm_or_zero(), 0.0);
        assert_eq!(estimate.status, EstimateStatus::NoPeaksDetected);
    }

    #[test]
    fn test_series_stats_skip_undetermined() {
        let series: BpmSeries = vec![
            point(0.0, Some(118.0)),
            point(3.0, None),
            point(6.0, Some(122.0)),
        ]
        .into_iter()
        .collect();

        let stats = series.stats().unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean, 120.0);
        assert_eq!(stats.min, 118.0);
        assert_eq!(stats.max, 122.0);
        assert!((stats.std_dev - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_series_stats_empty() {
        let series: BpmSeries = vec![point(0.0, None)].into_iter().collect();
        assert!(series.stats().is_none());
        assert!(BpmSeries::new().stats().is_none());
    }

    #[test]
    fn test_since_and_pairs() {
        let series: BpmSeries = vec![point(0.0, Some(100.0)), point(5.0, Some(110.0))]
            .into_iter()
            .collect();
        let tail = series.since(2.5);
        assert_eq!(tail.len(), 1);
        assert_eq!(tail.pairs(), vec![(5.0, Some(110.0))]);
    }

    #[test]
    fn test_serialization_omits_missing_timestamp() {
        let json = serde_json::to_string(&BpmEstimate::undetermined()).unwrap();
        assert!(json.contains(r#""bpm":null"#));
        assert!(json.contains(r#""status":"no_peaks_detected""#));
        assert!(!json.contains("timestamp_seconds"));
    }
}
