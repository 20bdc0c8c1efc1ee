// Framing module - Sliding-window segmentation of a signal
//
// RMS, zero-crossing rate and the spectral measurements share centered
// framing: the signal is padded by half a frame on each side so the first
// frame is centered on sample 0, giving `1 + len / hop` frames. The amplitude
// envelope walks the raw signal instead (see `envelope_windows`).

use serde::{Deserialize, Serialize};

use crate::error::IndexError;

/// Default analysis window length in samples
pub const DEFAULT_FRAME_SIZE: usize = 1024;

/// Default step between window starts in samples
pub const DEFAULT_HOP_SIZE: usize = 512;

/// Frame/hop parameters shared by every descriptor in an index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FramingParams {
    pub frame_size: usize,
    pub hop_size: usize,
}

impl Default for FramingParams {
    fn default() -> Self {
        Self {
            frame_size: DEFAULT_FRAME_SIZE,
            hop_size: DEFAULT_HOP_SIZE,
        }
    }
}

impl FramingParams {
    pub fn new(frame_size: usize, hop_size: usize) -> Result<Self, IndexError> {
        let params = Self {
            frame_size,
            hop_size,
        };
        params.validate()?;
        Ok(params)
    }

    /// Both sizes must be non-zero and the hop may not skip samples between frames.
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.frame_size < 2 || self.hop_size == 0 || self.hop_size > self.frame_size {
            return Err(IndexError::InvalidFraming {
                frame_size: self.frame_size,
                hop_size: self.hop_size,
            });
        }
        Ok(())
    }
}

/// How the half-frame margins around the signal are filled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadMode {
    /// Zeros on both sides (energy and spectral measurements)
    Zero,
    /// Repeat the first/last sample (zero-crossing rate, so the margins add no crossings)
    Edge,
}

/// Centered, overlapping frames over a padded copy of the signal
pub struct CenteredFrames {
    padded: Vec<f32>,
    frame_size: usize,
    hop_size: usize,
    count: usize,
}

impl CenteredFrames {
    pub fn new(samples: &[f32], params: FramingParams, mode: PadMode) -> Self {
        let left = params.frame_size / 2;
        let right = params.frame_size - left;

        let (head, tail) = match mode {
            PadMode::Zero => (0.0, 0.0),
            PadMode::Edge => (
                samples.first().copied().unwrap_or(0.0),
                samples.last().copied().unwrap_or(0.0),
            ),
        };

        let mut padded = Vec::with_capacity(samples.len() + params.frame_size);
        padded.resize(left, head);
        padded.extend_from_slice(samples);
        padded.resize(left + samples.len() + right, tail);

        Self {
            padded,
            frame_size: params.frame_size,
            hop_size: params.hop_size,
            count: 1 + samples.len() / params.hop_size,
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f32]> + '_ {
        (0..self.count).map(move |i| {
            let start = i * self.hop_size;
            &self.padded[start..start + self.frame_size]
        })
    }
}

/// Envelope windows: one every `hop_size` samples from sample 0, each up to
/// `frame_size` long and clamped at the end of the signal.
///
/// Yields `ceil(len / hop_size)` windows.
pub fn envelope_windows(
    samples: &[f32],
    params: FramingParams,
) -> impl Iterator<Item = &[f32]> + '_ {
    (0..samples.len())
        .step_by(params.hop_size)
        .map(move |start| &samples[start..(start + params.frame_size).min(samples.len())])
}
