//! WAV decoding into mono `AudioSignal`s.

use std::path::Path;

use anyhow::{anyhow, Context, Result};

use crate::analysis::AudioSignal;

/// Decode a PCM or float WAV file
///
/// Integer samples are scaled to [-1.0, 1.0]. Multi-channel files are
/// downmixed to mono by averaging the channels of each frame.
pub fn read_wav(path: &Path) -> Result<AudioSignal> {
    let mut reader =
        hound::WavReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        return Err(anyhow!("{} declares zero channels", path.display()));
    }

    let interleaved = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|sample| sample.map_err(|err| anyhow!(err)))
            .collect::<Result<Vec<f32>>>()?,
        hound::SampleFormat::Int => {
            let max = ((1i64 << (spec.bits_per_sample - 1)) - 1) as f32;
            match spec.bits_per_sample {
                8 | 16 | 24 | 32 => reader
                    .samples::<i32>()
                    .map(|sample| {
                        sample
                            .map(|value| value as f32 / max)
                            .map_err(|err| anyhow!(err))
                            .with_context(|| format!("decoding {}", path.display()))
                    })
                    .collect::<Result<Vec<f32>>>()?,
                other => {
                    return Err(anyhow!(
                        "Unsupported bits per sample {} in {}",
                        other,
                        path.display()
                    ))
                }
            }
        }
    };

    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
            .collect()
    };

    log::debug!(
        "[Wav] Decoded {} ({} samples @ {} Hz, {} channel(s))",
        path.display(),
        samples.len(),
        spec.sample_rate,
        channels
    );

    Ok(AudioSignal::new(samples, spec.sample_rate))
}
