// Spectral module - Frequency-domain feature extraction
//
// This module computes spectral features from magnitude spectra.
// Bin k is mapped to frequency k * sample_rate / fft_size.
//
// References:
// - Peeters, G. (2004). A large set of audio features for sound description
// - Lerch, A. (2012). An Introduction to Audio Content Analysis

/// Magnitude sums below this are treated as silence
const SILENCE_THRESHOLD: f32 = 1e-10;

/// Spectral feature computation for one sample rate / FFT size pair
pub struct SpectralFeatures {
    sample_rate: u32,
    fft_size: usize,
}

impl SpectralFeatures {
    /// Create a new spectral features processor
    ///
    /// # Arguments
    /// * `sample_rate` - Audio sample rate in Hz
    /// * `fft_size` - FFT window size
    pub fn new(sample_rate: u32, fft_size: usize) -> Self {
        Self {
            sample_rate,
            fft_size,
        }
    }

    fn bin_frequency(&self, bin: usize) -> f32 {
        bin as f32 * self.sample_rate as f32 / self.fft_size as f32
    }

    /// Compute spectral centroid (weighted mean frequency)
    ///
    /// Formula: centroid = Σ(f_i × |X[i]|) / Σ|X[i]|
    ///
    /// Returns 0.0 for an all-zero spectrum.
    pub fn compute_centroid(&self, spectrum: &[f32]) -> f32 {
        let magnitude_sum: f32 = spectrum.iter().sum();
        if magnitude_sum <= SILENCE_THRESHOLD {
            return 0.0;
        }

        let weighted_sum: f32 = spectrum
            .iter()
            .enumerate()
            .map(|(i, &mag)| self.bin_frequency(i) * mag)
            .sum();

        weighted_sum / magnitude_sum
    }

    /// Compute spectral bandwidth (weighted standard deviation around the centroid)
    ///
    /// Formula: bandwidth = sqrt(Σ(|X[i]| × (f_i - centroid)²) / Σ|X[i]|)
    ///
    /// Returns 0.0 for an all-zero spectrum.
    pub fn compute_bandwidth(&self, spectrum: &[f32], centroid: f32) -> f32 {
        let magnitude_sum: f32 = spectrum.iter().sum();
        if magnitude_sum <= SILENCE_THRESHOLD {
            return 0.0;
        }

        let spread: f32 = spectrum
            .iter()
            .enumerate()
            .map(|(i, &mag)| {
                let deviation = self.bin_frequency(i) - centroid;
                mag * deviation * deviation
            })
            .sum();

        (spread / magnitude_sum).sqrt()
    }
}
