//! Example: Real-time tempo monitoring
//!
//! Feeds a synthetic drum pattern that speeds up from 100 to 130 BPM into a monitor in
//! 250 ms chunks, printing each estimate as it arrives, then compares the live series
//! against a segmented analysis of the same audio.
//!
//! Usage:
//!   RUST_LOG=debug cargo run --example stream_monitor

use std::thread;
use std::time::Duration;

use stratum_tempo::monitor::ChunkResult;
use stratum_tempo::{analyze_segments, compare, spawn_monitor, AnalysisConfig, SampleBuffer};

const SAMPLE_RATE: u32 = 44100;

/// Decaying 60 Hz kick bursts at a tempo ramping linearly from `start_bpm` to `end_bpm`
fn generate_ramp(start_bpm: f32, end_bpm: f32, seconds: f32) -> Vec<f32> {
    let total = (seconds * SAMPLE_RATE as f32) as usize;
    let mut samples = vec![0.0f32; total];
    let burst = (0.1 * SAMPLE_RATE as f32) as usize;

    let mut onset = 0usize;
    while onset < total {
        for (i, sample) in samples[onset..(onset + burst).min(total)].iter_mut().enumerate() {
            let t = i as f32 / SAMPLE_RATE as f32;
            *sample = 0.8 * (2.0 * std::f32::consts::PI * 60.0 * t).sin() * (-30.0 * t).exp();
        }
        let progress = onset as f32 / total as f32;
        let bpm = start_bpm + (end_bpm - start_bpm) * progress;
        onset += (60.0 / bpm * SAMPLE_RATE as f32) as usize;
    }
    samples
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = AnalysisConfig {
        frame_size: 1024,
        hop_size: 512,
        ..Default::default()
    };
    let samples = generate_ramp(100.0, 130.0, 20.0);
    let monitor = spawn_monitor(config.clone(), 8)?;

    let print = |result: ChunkResult| match result {
        Ok(estimate) => println!(
            "{:>6.2}s  {:>6}  {:?}",
            estimate.timestamp_seconds.unwrap_or(0.0),
            estimate
                .bpm
                .map_or_else(|| "--".to_string(), |b| format!("{:.1}", b)),
            estimate.status
        ),
        Err(e) => eprintln!("chunk skipped: {}", e),
    };

    let chunk_len = SAMPLE_RATE as usize / 4;
    let mut submitted = 0;
    let mut printed = 0;
    for chunk in samples.chunks(chunk_len) {
        monitor.submit(SampleBuffer::mono(chunk.to_vec(), SAMPLE_RATE))?;
        submitted += 1;
        for result in monitor.results().try_iter() {
            print(result);
            printed += 1;
        }
        // Pace like a live input
        thread::sleep(Duration::from_millis(25));
    }
    // One result per chunk
    while printed < submitted {
        print(monitor.results().recv()?);
        printed += 1;
    }
    let live = monitor.finish();

    let reference = analyze_segments(&SampleBuffer::mono(samples, SAMPLE_RATE), &config, 5.0)?;
    if let Some(comparison) = compare(&reference, &live) {
        println!(
            "\nReference {:.1} BPM, live mean {:.1} BPM ({:.1}% off)",
            comparison.reference_bpm, comparison.mean_bpm, comparison.percent_diff
        );
        println!(
            "Stability {:.0}/100, within 5%: {:.0}%",
            comparison.stability_score, comparison.within_5_percent
        );
        println!("Trend: {:?}", comparison.trend);
    }

    Ok(())
}
