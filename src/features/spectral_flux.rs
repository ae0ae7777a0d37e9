//! Spectral flux onset feature
//!
//! Positive change of the Hann-windowed magnitude spectrum between consecutive frames:
//!
//! `flux[t] = sum_k max(0, |X_t[k]| - |X_{t-1}[k]|)^2 / N^2`
//!
//! Dividing by `N^2` puts the value on the scale of length-normalized energy, so the two
//! blend without a global normalization pass. The tracker holds the previous spectrum;
//! one instance must see frames in order.

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// Frame-to-frame spectral flux tracker
pub struct SpectralFlux {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    prev_magnitudes: Option<Vec<f32>>,
    frame_size: usize,
}

impl std::fmt::Debug for SpectralFlux {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectralFlux")
            .field("frame_size", &self.frame_size)
            .field("primed", &self.prev_magnitudes.is_some())
            .finish()
    }
}

impl SpectralFlux {
    /// Create a tracker for frames of `frame_size` samples
    pub fn new(frame_size: usize) -> Self {
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(frame_size);

        let window: Vec<f32> = (0..frame_size)
            .map(|i| {
                if frame_size <= 1 {
                    1.0
                } else {
                    let t = i as f32 / (frame_size - 1) as f32;
                    0.5 * (1.0 - (2.0 * PI * t).cos())
                }
            })
            .collect();

        Self {
            fft,
            window,
            buffer: vec![Complex::new(0.0, 0.0); frame_size],
            prev_magnitudes: None,
            frame_size,
        }
    }

    /// Feed the next frame and return its flux (0.0 for the first frame)
    ///
    /// Frames with a different length than the tracker was built for yield 0.0.
    pub fn process(&mut self, frame: &[f32]) -> f32 {
        if frame.len() != self.frame_size || self.frame_size == 0 {
            return 0.0;
        }

        for ((slot, &s), &w) in self.buffer.iter_mut().zip(frame).zip(&self.window) {
            *slot = Complex::new(s * w, 0.0);
        }
        self.fft.process(&mut self.buffer);

        let half = self.frame_size / 2 + 1;
        let magnitudes: Vec<f32> = self.buffer[..half].iter().map(|c| c.norm()).collect();

        let flux = match &self.prev_magnitudes {
            Some(prev) => {
                let sum: f64 = magnitudes
                    .iter()
                    .zip(prev)
                    .map(|(&cur, &p)| {
                        let diff = (cur - p).max(0.0) as f64;
                        diff * diff
                    })
                    .sum();
                let n = self.frame_size as f64;
                (sum / (n * n)) as f32
            }
            None => 0.0,
        };

        self.prev_magnitudes = Some(magnitudes);
        flux
    }

    /// Forget the previous spectrum
    pub fn reset(&mut self) {
        self.prev_magnitudes = None;
    }
}
