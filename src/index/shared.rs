// SharedIndex - Serialized access to one SimilarityIndex from many callers
//
// All mutations and queries go through a single mutex, so an insert
// (rebuild included) completes before any later query observes the index.
// Feature extraction runs outside the lock since the extractor is immutable.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::analysis::{AudioSignal, FeatureExtractor};
use crate::error::{log_index_error, IndexError};

use super::{extract_batch, Match, Record, SimilarityIndex};

/// Cloneable handle to an index shared between threads
#[derive(Clone)]
pub struct SharedIndex {
    extractor: Arc<FeatureExtractor>,
    index: Arc<Mutex<SimilarityIndex>>,
}

impl SharedIndex {
    pub fn new(index: SimilarityIndex) -> Self {
        Self {
            extractor: index.extractor(),
            index: Arc::new(Mutex::new(index)),
        }
    }

    /// Lock the index
    ///
    /// Returns MutexGuard or IndexError::LockPoisoned on lock failure
    fn lock(&self) -> Result<MutexGuard<'_, SimilarityIndex>, IndexError> {
        self.index.lock().map_err(|_| {
            let err = IndexError::LockPoisoned {
                component: "SimilarityIndex".to_string(),
            };
            log_index_error(&err, "SharedIndex::lock");
            err
        })
    }

    pub fn bulk_load<I, L>(&self, items: I) -> Result<(), IndexError>
    where
        I: IntoIterator<Item = (AudioSignal, L)>,
        L: Into<String>,
    {
        let descriptors = extract_batch(&self.extractor, items)?;

        self.lock()?.bulk_load_descriptors(descriptors)
    }

    pub fn insert(
        &self,
        signal: &AudioSignal,
        label: impl Into<String>,
    ) -> Result<u64, IndexError> {
        let descriptor = self.extractor.extract(signal)?;
        self.lock()?.insert_descriptor(descriptor, label)
    }

    pub fn query(&self, signal: &AudioSignal, k: usize) -> Result<Vec<Match>, IndexError> {
        // Empty index answers without analysing the signal
        if self.lock()?.is_empty() {
            return Ok(Vec::new());
        }

        // Extraction runs unlocked; the second lock still sees every insert
        // that completed before it was taken.
        let descriptor = self.extractor.extract(signal)?;
        Ok(self.lock()?.query_descriptor(&descriptor, k))
    }

    pub fn len(&self) -> Result<usize, IndexError> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, IndexError> {
        Ok(self.lock()?.is_empty())
    }

    /// Copy of the current records
    pub fn snapshot(&self) -> Result<Vec<Record>, IndexError> {
        Ok(self.lock()?.records().to_vec())
    }
}
