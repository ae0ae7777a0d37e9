//! Descriptive statistics over BPM values
//!
//! All arithmetic runs in `f64`; inputs and outputs stay `f32` like the rest of the
//! pipeline. NaN values sort as equal and should be kept out by callers.

use std::cmp::Ordering;

fn sorted(values: &[f32]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().map(|&v| v as f64).collect();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    sorted
}

fn percentile_of_sorted(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Percentile with linear interpolation between order statistics
///
/// Uses position `p * (n - 1)` in the sorted values, the same convention as the
/// default in most numerical packages. `p` is clamped to [0, 1].
/// Returns `None` for empty input.
pub fn percentile(values: &[f32], p: f32) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted(values);
    Some(percentile_of_sorted(&sorted, p.clamp(0.0, 1.0) as f64) as f32)
}

/// First and third quartiles
pub fn quartiles(values: &[f32]) -> Option<(f32, f32)> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted(values);
    Some((
        percentile_of_sorted(&sorted, 0.25) as f32,
        percentile_of_sorted(&sorted, 0.75) as f32,
    ))
}

/// Median (mean of the two middle values for even counts)
pub fn median(values: &[f32]) -> Option<f32> {
    percentile(values, 0.5)
}

/// Arithmetic mean
pub fn mean(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    let sum: f64 = values.iter().map(|&v| v as f64).sum();
    Some((sum / values.len() as f64) as f32)
}

/// Mean after discarding `proportion` of the values from each end
///
/// `proportion` is clamped to [0, 0.5). At least one value is always kept.
pub fn trimmed_mean(values: &[f32], proportion: f32) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    let sorted = sorted(values);
    let proportion = proportion.clamp(0.0, 0.499) as f64;
    let cut = ((sorted.len() as f64) * proportion).floor() as usize;
    let kept = &sorted[cut..sorted.len() - cut];
    Some((kept.iter().sum::<f64>() / kept.len() as f64) as f32)
}

/// Population standard deviation
pub fn std_dev(values: &[f32]) -> Option<f32> {
    let m = mean(values)? as f64;
    let var: f64 = values
        .iter()
        .map(|&v| {
            let d = v as f64 - m;
            d * d
        })
        .sum::<f64>()
        / values.len() as f64;
    Some(var.sqrt() as f32)
}

/// Means of each sliding window of `window` values
///
/// Returns the input unchanged when it is shorter than the window.
pub fn moving_average(values: &[f32], window: usize) -> Vec<f32> {
    if window <= 1 || values.len() < window {
        return values.to_vec();
    }
    values
        .windows(window)
        .map(|w| (w.iter().map(|&v| v as f64).sum::<f64>() / window as f64) as f32)
        .collect()
}
