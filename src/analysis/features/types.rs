// Types module - Data structures for audio descriptors
//
// This module defines the input signal and the fixed-length descriptor that
// flows from the feature extractor into the similarity index.

use serde::{Deserialize, Serialize};

use crate::error::IndexError;

/// Number of scalars in every descriptor
pub const DESCRIPTOR_DIM: usize = 5;

/// A decoded mono audio signal
///
/// Decoding is the caller's job; the extractor only sees raw amplitudes and
/// passes the sample rate through to the spectral measurements.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSignal {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioSignal {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Five-scalar summary of an audio clip
///
/// Component order is fixed: RMS, zero-crossing rate, spectral centroid,
/// spectral bandwidth, amplitude envelope. Every descriptor stored in one
/// index is produced by the same extractor, so components are comparable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Descriptor([f32; DESCRIPTOR_DIM]);

impl Descriptor {
    pub fn new(values: [f32; DESCRIPTOR_DIM]) -> Self {
        Self(values)
    }

    /// Build a descriptor from a slice, rejecting anything that is not exactly
    /// [`DESCRIPTOR_DIM`] long.
    pub fn from_slice(values: &[f32]) -> Result<Self, IndexError> {
        let array: [f32; DESCRIPTOR_DIM] =
            values.try_into().map_err(|_| IndexError::DimensionMismatch {
                expected: DESCRIPTOR_DIM,
                got: values.len(),
            })?;
        Ok(Self(array))
    }

    pub fn values(&self) -> &[f32; DESCRIPTOR_DIM] {
        &self.0
    }

    /// Mean frame RMS energy
    pub fn rms(&self) -> f32 {
        self.0[0]
    }

    /// Mean zero-crossing rate (0.0 to 1.0)
    pub fn zcr(&self) -> f32 {
        self.0[1]
    }

    /// Mean spectral centroid in Hz
    pub fn centroid(&self) -> f32 {
        self.0[2]
    }

    /// Mean spectral bandwidth in Hz
    pub fn bandwidth(&self) -> f32 {
        self.0[3]
    }

    /// Mean amplitude envelope
    pub fn envelope(&self) -> f32 {
        self.0[4]
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    /// Manhattan distance: Σ|a[i] - b[i]|
    pub fn l1_distance(&self, other: &Descriptor) -> f32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b).abs())
            .sum()
    }
}

impl std::ops::Index<usize> for Descriptor {
    type Output = f32;

    fn index(&self, axis: usize) -> &f32 {
        &self.0[axis]
    }
}

impl From<[f32; DESCRIPTOR_DIM]> for Descriptor {
    fn from(values: [f32; DESCRIPTOR_DIM]) -> Self {
        Self(values)
    }
}
