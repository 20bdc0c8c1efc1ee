// Analysis module - DSP pipeline from decoded signal to descriptor
//
// The feature extractor is the only analysis stage: it turns an AudioSignal
// into the five-scalar Descriptor the similarity index stores and searches.

pub mod features;

pub use features::{
    AudioSignal, Descriptor, FeatureExtractor, FramingParams, DEFAULT_FRAME_SIZE,
    DEFAULT_HOP_SIZE, DESCRIPTOR_DIM,
};
