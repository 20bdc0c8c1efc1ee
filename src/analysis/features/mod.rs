// FeatureExtractor - DSP descriptor extraction for audio similarity search
//
// This module turns a decoded mono signal into the five-scalar descriptor
// stored by the similarity index. Every scalar is a per-frame measurement
// averaged over all frames of the clip.
//
// Module organization:
// - types: Data structures (AudioSignal, Descriptor)
// - framing: Frame/hop parameters and window iteration
// - fft: FFT computation with windowing
// - spectral: Frequency-domain features (centroid, bandwidth)
// - temporal: Time-domain features (RMS, ZCR, peak)
// - mod.rs: Coordinator (FeatureExtractor)
//
// Descriptor components, in order:
// 1. RMS energy
// 2. Zero-crossing rate
// 3. Spectral centroid
// 4. Spectral bandwidth
// 5. Amplitude envelope (peak |x| per hop-strided window)

mod fft;
mod framing;
mod spectral;
mod temporal;
mod types;

pub use framing::{FramingParams, DEFAULT_FRAME_SIZE, DEFAULT_HOP_SIZE};
pub use types::{AudioSignal, Descriptor, DESCRIPTOR_DIM};

use fft::FftProcessor;
use framing::{envelope_windows, CenteredFrames, PadMode};
use spectral::SpectralFeatures;

use crate::error::IndexError;

/// FeatureExtractor coordinates the descriptor extraction pipeline
///
/// One extractor owns one set of framing parameters; the similarity index
/// holds a single extractor so every stored descriptor is comparable.
pub struct FeatureExtractor {
    fft_processor: FftProcessor,
    framing: FramingParams,
}

impl FeatureExtractor {
    /// Create a new FeatureExtractor for the given framing parameters
    pub fn new(framing: FramingParams) -> Result<Self, IndexError> {
        framing.validate()?;

        Ok(Self {
            fft_processor: FftProcessor::new(framing.frame_size),
            framing,
        })
    }

    pub fn framing(&self) -> FramingParams {
        self.framing
    }

    /// Extract the descriptor of a whole clip
    ///
    /// # Errors
    /// `InvalidAudioInput` if the signal is empty, contains non-finite samples,
    /// or produces a non-finite descriptor.
    pub fn extract(&self, signal: &AudioSignal) -> Result<Descriptor, IndexError> {
        validate_signal(signal)?;

        let samples = &signal.samples;
        let spectral = SpectralFeatures::new(signal.sample_rate, self.fft_processor.fft_size());

        let energy_frames = CenteredFrames::new(samples, self.framing, PadMode::Zero);
        let mut rms_sum = 0.0_f64;
        let mut centroid_sum = 0.0_f64;
        let mut bandwidth_sum = 0.0_f64;
        for frame in energy_frames.iter() {
            rms_sum += temporal::compute_rms(frame) as f64;

            let spectrum = self.fft_processor.compute_magnitude_spectrum(frame);
            let centroid = spectral.compute_centroid(&spectrum);
            centroid_sum += centroid as f64;
            bandwidth_sum += spectral.compute_bandwidth(&spectrum, centroid) as f64;
        }
        let frame_count = energy_frames.len() as f64;

        let zcr_frames = CenteredFrames::new(samples, self.framing, PadMode::Edge);
        let zcr = mean(zcr_frames.iter().map(temporal::compute_zcr));

        let envelope = mean(envelope_windows(samples, self.framing).map(temporal::compute_peak));

        let descriptor = Descriptor::new([
            (rms_sum / frame_count) as f32,
            zcr,
            (centroid_sum / frame_count) as f32,
            (bandwidth_sum / frame_count) as f32,
            envelope,
        ]);

        if !descriptor.is_finite() {
            return Err(IndexError::InvalidAudioInput {
                reason: format!("descriptor is not finite: {:?}", descriptor.values()),
            });
        }

        log::debug!(
            "[FeatureExtractor] {} samples @ {} Hz -> {:?}",
            samples.len(),
            signal.sample_rate,
            descriptor.values()
        );

        Ok(descriptor)
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self {
            fft_processor: FftProcessor::new(DEFAULT_FRAME_SIZE),
            framing: FramingParams::default(),
        }
    }
}

fn validate_signal(signal: &AudioSignal) -> Result<(), IndexError> {
    if signal.is_empty() {
        return Err(IndexError::InvalidAudioInput {
            reason: "signal is empty".to_string(),
        });
    }

    if let Some(position) = signal.samples.iter().position(|s| !s.is_finite()) {
        return Err(IndexError::InvalidAudioInput {
            reason: format!("non-finite sample at index {}", position),
        });
    }

    Ok(())
}

fn mean(values: impl Iterator<Item = f32>) -> f32 {
    let (sum, count) = values.fold((0.0_f64, 0usize), |(sum, count), v| {
        (sum + v as f64, count + 1)
    });
    if count == 0 {
        0.0
    } else {
        (sum / count as f64) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: u32 = 48000;

    /// Generate pure sine wave for testing
    fn generate_sine_wave(sample_rate: u32, frequency: f32, duration_samples: usize) -> Vec<f32> {
        (0..duration_samples)
            .map(|i| {
                let t = i as f32 / sample_rate as f32;
                (2.0 * std::f32::consts::PI * frequency * t).sin()
            })
            .collect()
    }

    /// Generate white noise for testing
    fn generate_white_noise(duration_samples: usize) -> Vec<f32> {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        (0..duration_samples)
            .map(|_| rng.gen_range(-1.0..1.0))
            .collect()
    }

    fn extract(samples: Vec<f32>) -> Descriptor {
        FeatureExtractor::default()
            .extract(&AudioSignal::new(samples, SAMPLE_RATE))
            .unwrap()
    }

    #[test]
    fn test_feature_extractor_creation() {
        let extractor = FeatureExtractor::default();
        assert_eq!(extractor.framing().frame_size, 1024);
        assert_eq!(extractor.framing().hop_size, 512);

        assert!(FeatureExtractor::new(FramingParams {
            frame_size: 1024,
            hop_size: 0
        })
        .is_err());
    }

    #[test]
    fn test_descriptor_is_finite() {
        let signals = [
            generate_sine_wave(SAMPLE_RATE, 440.0, 8000),
            generate_white_noise(5000),
            vec![0.3],
            vec![1.0; 1024],
        ];
        for samples in signals {
            let descriptor = extract(samples);
            assert_eq!(descriptor.values().len(), DESCRIPTOR_DIM);
            assert!(descriptor.is_finite(), "{:?}", descriptor);
        }
    }

    #[test]
    fn test_centroid_low_vs_high_frequency() {
        let low = extract(generate_sine_wave(SAMPLE_RATE, 200.0, 8160));
        let high = extract(generate_sine_wave(SAMPLE_RATE, 6000.0, 8160));

        assert!(
            low.centroid() < 1000.0,
            "Expected centroid < 1000 Hz for 200 Hz sine, got {} Hz",
            low.centroid()
        );
        assert!(
            high.centroid() > 4000.0,
            "Expected centroid > 4000 Hz for 6000 Hz sine, got {} Hz",
            high.centroid()
        );
    }

    #[test]
    fn test_bandwidth_sine_vs_noise() {
        let sine = extract(generate_sine_wave(SAMPLE_RATE, 1000.0, 8160));
        let noise = extract(generate_white_noise(8192));

        assert!(
            noise.bandwidth() > sine.bandwidth(),
            "Expected noise bandwidth {} > sine bandwidth {}",
            noise.bandwidth(),
            sine.bandwidth()
        );
    }

    #[test]
    fn test_zcr_sine_vs_noise() {
        let sine = extract(generate_sine_wave(SAMPLE_RATE, 100.0, 8192));
        let noise = extract(generate_white_noise(8192));

        assert!(sine.zcr() < 0.1, "Expected sine ZCR < 0.1, got {}", sine.zcr());
        assert!(noise.zcr() > 0.3, "Expected noise ZCR > 0.3, got {}", noise.zcr());
    }

    #[test]
    fn test_amplitude_envelope_of_constant_signal() {
        let descriptor = extract(vec![-0.5; 3000]);
        assert!((descriptor.envelope() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_rms_of_full_scale_sine() {
        // Edge frames are half padding, so the mean sits a bit below 1/sqrt(2)
        let descriptor = extract(generate_sine_wave(SAMPLE_RATE, 1000.0, 48000));
        assert!(descriptor.rms() > 0.65 && descriptor.rms() < 0.72);
    }

    #[test]
    fn test_extract_with_silence() {
        let descriptor = extract(vec![0.0; 4096]);

        assert_eq!(descriptor.rms(), 0.0);
        assert_eq!(descriptor.zcr(), 0.0);
        assert_eq!(descriptor.centroid(), 0.0, "Centroid should be 0 for silence");
        assert_eq!(descriptor.bandwidth(), 0.0, "Bandwidth should be 0 for silence");
        assert_eq!(descriptor.envelope(), 0.0);
    }

    #[test]
    fn test_empty_signal_is_invalid() {
        let err = FeatureExtractor::default()
            .extract(&AudioSignal::new(Vec::new(), SAMPLE_RATE))
            .unwrap_err();
        assert!(matches!(err, IndexError::InvalidAudioInput { .. }));
    }

    #[test]
    fn test_non_finite_sample_is_invalid() {
        let err = FeatureExtractor::default()
            .extract(&AudioSignal::new(vec![0.1, f32::NAN, 0.2], SAMPLE_RATE))
            .unwrap_err();
        match err {
            IndexError::InvalidAudioInput { reason } => assert!(reason.contains("index 1")),
            other => panic!("Expected InvalidAudioInput, got {:?}", other),
        }
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let samples = generate_sine_wave(SAMPLE_RATE, 523.0, 6000);
        assert_eq!(extract(samples.clone()), extract(samples));
    }
}
