//! Example: Estimate the tempo of a WAV file
//!
//! Usage:
//!   cargo run --release --example analyze_wav -- [--segment SECONDS] [--config FILE] [--json] <file.wav>
//!
//! Notes:
//! - Without `--segment`, prints one estimate for the whole file.
//! - With `--segment`, prints a timestamped series as CSV (or JSON with `--json`).
//! - Multi-channel files are averaged to mono.

use std::env;
use std::time::Instant;

use stratum_tempo::analysis::export::{to_json, write_csv};
use stratum_tempo::{analyze, analyze_segments, AnalysisConfig, ChannelMixMode, SampleBuffer};

fn load_wav(path: &str) -> Result<SampleBuffer, Box<dyn std::error::Error>> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>()?,
        hound::SampleFormat::Int => {
            let max_value = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|s| s as f32 / max_value))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    let buffer = SampleBuffer::new(samples, spec.sample_rate, spec.channels);
    Ok(buffer.to_mono(ChannelMixMode::Average)?)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let mut json = false;
    let mut segment: Option<f64> = None;
    let mut config = AnalysisConfig::default();
    let mut path: Option<String> = None;

    while let Some(a) = args.first().cloned() {
        args.remove(0);
        match a.as_str() {
            "--json" => json = true,
            "--segment" => {
                let v = args
                    .first()
                    .ok_or("--segment requires a value")?
                    .parse::<f64>()?;
                args.remove(0);
                segment = Some(v);
            }
            "--config" => {
                let file = args.first().ok_or("--config requires a path")?.clone();
                args.remove(0);
                config = AnalysisConfig::from_json_str(&std::fs::read_to_string(file)?)?;
            }
            "--help" | "-h" => {
                eprintln!(
                    "Usage: analyze_wav [--segment SECONDS] [--config FILE] [--json] <file.wav>\n\
                     \n\
                     --segment S  Analyze consecutive S-second segments\n\
                     --config F   Analysis configuration as JSON\n\
                     --json       Emit JSON instead of text/CSV\n"
                );
                return Ok(());
            }
            _ => path = Some(a),
        }
    }

    let Some(path) = path else {
        eprintln!("ERROR: Provide a WAV file path. Use --help for usage.");
        std::process::exit(2);
    };

    let buffer = load_wav(&path)?;
    eprintln!(
        "Loaded {}: {:.2}s at {} Hz",
        path,
        buffer.duration_seconds(),
        buffer.sample_rate()
    );

    let t0 = Instant::now();
    match segment {
        Some(seconds) => {
            let series = analyze_segments(&buffer, &config, seconds)?;
            if json {
                println!("{}", to_json(&series)?);
            } else {
                write_csv(&series, std::io::stdout().lock())?;
            }
            if let Some(stats) = series.stats() {
                eprintln!(
                    "Segments: {} determined, mean {:.1} BPM (min {:.1}, max {:.1}, std {:.2})",
                    stats.count, stats.mean, stats.min, stats.max, stats.std_dev
                );
            }
        }
        None => {
            let estimate = analyze(&buffer, &config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&estimate)?);
            } else {
                match estimate.bpm {
                    Some(bpm) => println!("BPM: {:.1} ({:?})", bpm, estimate.status),
                    None => println!("BPM: -- ({:?})", estimate.status),
                }
                println!(
                    "  Peaks: {}, candidates: {} ({} accepted), mean ZCR: {:.4}",
                    estimate.peak_count,
                    estimate.candidate_count,
                    estimate.accepted_count,
                    estimate.mean_zcr
                );
            }
        }
    }
    eprintln!("Processing time: {:.2} ms", t0.elapsed().as_secs_f64() * 1000.0);

    Ok(())
}
