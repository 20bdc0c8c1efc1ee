// FFT module - Fast Fourier Transform computation
//
// This module handles FFT computation with Hann windowing to reduce
// spectral leakage. The magnitude spectrum feeds the spectral centroid and
// bandwidth measurements.

use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// FFT processor that computes magnitude spectra from audio frames
pub struct FftProcessor {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    /// Periodic Hann window (pre-computed)
    window: Vec<f32>,
}

impl FftProcessor {
    /// Create a new FFT processor
    ///
    /// The plan is built once here; `fft_size` is the frame size of the
    /// extractor that owns this processor.
    pub fn new(fft_size: usize) -> Self {
        let window = (0..fft_size)
            .map(|i| {
                0.5 * (1.0 - ((2.0 * std::f32::consts::PI * i as f32) / fft_size as f32).cos())
            })
            .collect();

        let fft = FftPlanner::new().plan_fft_forward(fft_size);

        Self {
            fft,
            fft_size,
            window,
        }
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of bins returned by [`compute_magnitude_spectrum`](Self::compute_magnitude_spectrum)
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2 + 1
    }

    /// Compute magnitude spectrum using FFT
    ///
    /// Applies Hann windowing, performs FFT, and returns magnitude spectrum
    /// for positive frequencies only (exploiting symmetry of real-valued FFT).
    /// Frames shorter than `fft_size` are zero-padded; longer ones are truncated.
    pub fn compute_magnitude_spectrum(&self, audio: &[f32]) -> Vec<f32> {
        let mut buffer: Vec<Complex<f32>> = audio
            .iter()
            .zip(self.window.iter())
            .map(|(&sample, &w)| Complex::new(sample * w, 0.0))
            .collect();
        buffer.resize(self.fft_size, Complex::new(0.0, 0.0));

        self.fft.process(&mut buffer);

        buffer[..self.bin_count()].iter().map(|c| c.norm()).collect()
    }
}
