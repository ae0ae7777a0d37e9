//! BPM candidate outlier filtering
//!
//! Tukey fences over the candidate pool: with `IQR = Q3 - Q1`, candidates outside
//! `[Q1 - k * IQR, Q3 + k * IQR]` are dropped. Quartiles use linear interpolation
//! between order statistics.

use super::{bpm_values, BpmCandidate};
use crate::analysis::stats::quartiles;

/// Smallest pool for which quartiles are trusted
///
/// Smaller pools pass through the filter unchanged.
pub const MIN_CANDIDATES_FOR_IQR: usize = 4;

/// Compute the acceptance band `(lower, upper)` for a set of BPM values
///
/// Returns `None` when there are fewer than [`MIN_CANDIDATES_FOR_IQR`] values.
pub fn iqr_fences(values: &[f32], k: f32) -> Option<(f32, f32)> {
    if values.len() < MIN_CANDIDATES_FOR_IQR {
        return None;
    }
    let (q1, q3) = quartiles(values)?;
    let iqr = q3 - q1;
    Some((q1 - k * iqr, q3 + k * iqr))
}

/// Keep the candidates inside an acceptance band (inclusive)
pub fn within_fences(candidates: &[BpmCandidate], fences: (f32, f32)) -> Vec<BpmCandidate> {
    let (lower, upper) = fences;
    candidates
        .iter()
        .filter(|c| c.bpm >= lower && c.bpm <= upper)
        .copied()
        .collect()
}

/// Remove statistical outliers from a candidate pool
///
/// # Arguments
///
/// * `candidates` - Plausible BPM candidates
/// * `k` - Fence multiplier (1.5 is the standard Tukey fence)
///
/// # Returns
///
/// The in-band candidates in their original order. Pools smaller than
/// [`MIN_CANDIDATES_FOR_IQR`] are returned unchanged. The result may be empty; the
/// caller decides how to fall back.
pub fn filter_outliers(candidates: &[BpmCandidate], k: f32) -> Vec<BpmCandidate> {
    let Some(fences) = iqr_fences(&bpm_values(candidates), k) else {
        log::debug!(
            "Skipping IQR filter: {} candidates (< {})",
            candidates.len(),
            MIN_CANDIDATES_FOR_IQR
        );
        return candidates.to_vec();
    };

    let kept = within_fences(candidates, fences);

    log::debug!(
        "IQR filter (k={:.2}): band [{:.2}, {:.2}], kept {}/{}",
        k,
        fences.0,
        fences.1,
        kept.len(),
        candidates.len()
    );

    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(values: &[f32]) -> Vec<BpmCandidate> {
        values
            .iter()
            .enumerate()
            .map(|(i, &bpm)| BpmCandidate {
                bpm,
                from_frame: i * 40,
                to_frame: (i + 1) * 40,
            })
            .collect()
    }

    #[test]
    fn test_removes_high_outlier() {
        let candidates = pool(&[60.0, 61.0, 59.0, 62.0, 200.0]);
        let filtered = filter_outliers(&candidates, 1.5);
        assert_eq!(bpm_values(&filtered), vec![60.0, 61.0, 59.0, 62.0]);
    }

    #[test]
    fn test_idempotent_on_in_band_set() {
        let candidates = pool(&[60.0, 61.0, 59.0, 62.0, 200.0]);
        let once = filter_outliers(&candidates, 1.5);
        let twice = filter_outliers(&once, 1.5);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_small_pool_passes_through() {
        let candidates = pool(&[60.0, 120.0, 200.0]);
        let filtered = filter_outliers(&candidates, 1.5);
        assert_eq!(filtered, candidates);
        assert!(iqr_fences(&[60.0, 120.0, 200.0], 1.5).is_none());
    }

    #[test]
    fn test_identical_values_kept() {
        let candidates = pool(&[120.0; 6]);
        assert_eq!(filter_outliers(&candidates, 1.5).len(), 6);
    }

    #[test]
    fn test_zero_k_keeps_interquartile_range_only() {
        let candidates = pool(&[100.0, 110.0, 120.0, 130.0, 140.0]);
        // Q1 = 110, Q3 = 130
        let filtered = filter_outliers(&candidates, 0.0);
        assert_eq!(bpm_values(&filtered), vec![110.0, 120.0, 130.0]);
    }

    #[test]
    fn test_empty_pool() {
        assert!(filter_outliers(&[], 1.5).is_empty());
    }
}
