// Audio Similarity Core - descriptor extraction and k-NN clip search
//
// Decoded clips are summarised by five signal statistics and stored in an
// index that answers "which stored clips are closest to this one" queries.

pub mod analysis;
pub mod audio;
pub mod config;
pub mod error;
pub mod index;

pub use analysis::{AudioSignal, Descriptor, FeatureExtractor, FramingParams};
pub use config::AppConfig;
pub use error::{ErrorCode, IndexError};
pub use index::{Match, Record, RebuildPolicy, SharedIndex, SimilarityIndex};
