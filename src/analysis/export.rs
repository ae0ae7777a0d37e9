//! Export of BPM time series as timestamp/BPM pairs
//!
//! CSV layout, one row per point:
//!
//! ```text
//! time_seconds,time_mmss,bpm
//! 0.000,00:00,120.2
//! 3.000,00:03,--
//! ```
//!
//! Undetermined points are written as `--`. BPM values are rounded to one decimal.

use std::io::{self, Write};

use super::result::BpmSeries;

/// CSV header row
pub const CSV_HEADER: &str = "time_seconds,time_mmss,bpm";

/// Format seconds as zero-padded `mm:ss`
pub fn format_mmss(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Write a series as CSV
///
/// # Errors
///
/// Propagates I/O errors from the writer
pub fn write_csv<W: Write>(series: &BpmSeries, mut writer: W) -> io::Result<()> {
    writeln!(writer, "{}", CSV_HEADER)?;
    for (seconds, bpm) in series.pairs() {
        writeln!(writer, "{}", csv_row(seconds, bpm))?;
    }
    writer.flush()
}

fn csv_row(seconds: f64, bpm: Option<f32>) -> String {
    match bpm {
        Some(bpm) => format!("{:.3},{},{:.1}", seconds, format_mmss(seconds), bpm),
        None => format!("{:.3},{},--", seconds, format_mmss(seconds)),
    }
}

/// Render a series as a CSV string
pub fn to_csv_string(series: &BpmSeries) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + series.len() * 20);
    out.push_str(CSV_HEADER);
    out.push('\n');
    for (seconds, bpm) in series.pairs() {
        out.push_str(&csv_row(seconds, bpm));
        out.push('\n');
    }
    out
}

/// Serialize a series as pretty-printed JSON
///
/// # Errors
///
/// Returns the serializer error (e.g. a non-finite float)
pub fn to_json(series: &BpmSeries) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(series)
}
