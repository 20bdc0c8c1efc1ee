// SimilarityIndex - k-nearest-neighbor search over audio descriptors
//
// The index owns the record collection (the only authoritative state) and a
// k-d tree derived from it. The tree is rebuilt from scratch whenever the
// collection changes, so any query answers against every record inserted
// before it.
//
// Module organization:
// - record: Record and Match types
// - kdtree: Balanced spatial partition and exact L1 search
// - shared: Mutex-guarded handle for callers on several threads
// - mod.rs: Coordinator (SimilarityIndex)

mod kdtree;
mod record;
mod shared;

pub use record::{Match, Record};
pub use shared::SharedIndex;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::analysis::{AudioSignal, Descriptor, FeatureExtractor, FramingParams};
use crate::config::AppConfig;
use crate::error::IndexError;
use kdtree::KdTree;

/// When the k-d tree is rebuilt after an insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RebuildPolicy {
    /// Rebuild as part of every insert
    #[default]
    Eager,
    /// Mark the tree stale on insert and rebuild once before the next query
    Deferred,
}

/// Descriptor collection plus the k-d tree built over it
pub struct SimilarityIndex {
    extractor: Arc<FeatureExtractor>,
    records: Vec<Record>,
    tree: Option<KdTree>,
    stale: bool,
    next_id: u64,
    policy: RebuildPolicy,
}

impl SimilarityIndex {
    /// Create an empty index whose descriptors all use `framing`
    pub fn new(framing: FramingParams) -> Result<Self, IndexError> {
        Ok(Self::with_extractor(FeatureExtractor::new(framing)?))
    }

    pub fn with_extractor(extractor: FeatureExtractor) -> Self {
        Self {
            extractor: Arc::new(extractor),
            records: Vec::new(),
            tree: None,
            stale: false,
            next_id: 0,
            policy: RebuildPolicy::default(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, IndexError> {
        Ok(Self::new(config.framing)?.with_policy(config.index.rebuild_policy))
    }

    pub fn with_policy(mut self, policy: RebuildPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RebuildPolicy {
        self.policy
    }

    pub fn framing(&self) -> FramingParams {
        self.extractor.framing()
    }

    /// Shared handle to the extractor every stored descriptor came from
    pub fn extractor(&self) -> Arc<FeatureExtractor> {
        Arc::clone(&self.extractor)
    }

    /// Replace the whole collection with `items`
    ///
    /// Every descriptor is extracted before anything is touched: an unreadable
    /// item aborts the batch and leaves the index as it was. Ids restart at 0
    /// and the tree is rebuilt once at the end.
    pub fn bulk_load<I, L>(&mut self, items: I) -> Result<(), IndexError>
    where
        I: IntoIterator<Item = (AudioSignal, L)>,
        L: Into<String>,
    {
        let descriptors = extract_batch(&self.extractor, items)?;

        self.bulk_load_descriptors(descriptors)
    }

    /// Replace the whole collection with pre-computed descriptors
    ///
    /// Descriptors must come from an extractor with this index's framing.
    pub fn bulk_load_descriptors<I, L>(&mut self, items: I) -> Result<(), IndexError>
    where
        I: IntoIterator<Item = (Descriptor, L)>,
        L: Into<String>,
    {
        let mut records = Vec::new();
        for (id, (descriptor, label)) in (0u64..).zip(items) {
            ensure_finite(&descriptor)?;
            records.push(Record {
                id,
                label: label.into(),
                descriptor,
            });
        }

        self.next_id = records.len() as u64;
        self.records = records;
        self.rebuild();

        log::info!(
            "[SimilarityIndex] Bulk loaded {} records",
            self.records.len()
        );
        Ok(())
    }

    /// Extract a descriptor from `signal` and append it under `label`
    ///
    /// Returns the assigned id. On failure the index is unchanged.
    pub fn insert(
        &mut self,
        signal: &AudioSignal,
        label: impl Into<String>,
    ) -> Result<u64, IndexError> {
        let descriptor = self.extractor.extract(signal)?;
        self.insert_descriptor(descriptor, label)
    }

    /// Append a pre-computed descriptor under `label`
    pub fn insert_descriptor(
        &mut self,
        descriptor: Descriptor,
        label: impl Into<String>,
    ) -> Result<u64, IndexError> {
        ensure_finite(&descriptor)?;

        let id = self.next_id;
        self.records.push(Record {
            id,
            label: label.into(),
            descriptor,
        });
        self.next_id += 1;

        match self.policy {
            RebuildPolicy::Eager => self.rebuild(),
            RebuildPolicy::Deferred => self.stale = true,
        }

        log::debug!(
            "[SimilarityIndex] Inserted record {} ({} total)",
            id,
            self.records.len()
        );
        Ok(id)
    }

    /// Find the `k` records closest to `signal` under L1 distance
    ///
    /// An empty index answers with no matches (the signal is not analysed).
    /// Results are sorted by ascending distance, ties by ascending id, and
    /// hold every record when `k` exceeds the collection size.
    pub fn query(&mut self, signal: &AudioSignal, k: usize) -> Result<Vec<Match>, IndexError> {
        if self.records.is_empty() {
            log::debug!("[SimilarityIndex] Query against empty index");
            return Ok(Vec::new());
        }

        let descriptor = self.extractor.extract(signal)?;
        Ok(self.query_descriptor(&descriptor, k))
    }

    /// Find the `k` records closest to a pre-computed descriptor
    pub fn query_descriptor(&mut self, descriptor: &Descriptor, k: usize) -> Vec<Match> {
        if self.stale {
            self.rebuild();
        }

        let tree = match &self.tree {
            Some(tree) => tree,
            None => return Vec::new(),
        };

        tree.nearest(descriptor, k)
            .into_iter()
            .map(|neighbor| {
                let record = &self.records[neighbor.position];
                Match {
                    id: record.id,
                    label: record.label.clone(),
                    distance: neighbor.distance,
                }
            })
            .collect()
    }

    /// Discard the k-d tree and build a new one from the current collection
    pub fn rebuild(&mut self) {
        let tree = if self.records.is_empty() {
            None
        } else {
            let points: Vec<Descriptor> = self.records.iter().map(|r| r.descriptor).collect();
            Some(KdTree::build(&points))
        };

        self.tree = tree;
        self.stale = false;

        log::debug!(
            "[SimilarityIndex] Rebuilt tree over {} records",
            self.records.len()
        );
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Id the next insert will receive
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// True when inserts are waiting for a deferred rebuild
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, id: u64) -> Option<&Record> {
        self.records
            .binary_search_by_key(&id, |r| r.id)
            .ok()
            .map(|position| &self.records[position])
    }

    /// Labels in insertion order, aligned with [`vectors`](Self::vectors)
    pub fn labels(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.label.as_str()).collect()
    }

    /// Descriptors in insertion order, aligned with [`labels`](Self::labels)
    pub fn vectors(&self) -> Vec<Descriptor> {
        self.records.iter().map(|r| r.descriptor).collect()
    }
}

impl Default for SimilarityIndex {
    fn default() -> Self {
        Self::with_extractor(FeatureExtractor::default())
    }
}

/// Extract every item of a batch, stopping at the first unreadable one
pub(crate) fn extract_batch<I, L>(
    extractor: &FeatureExtractor,
    items: I,
) -> Result<Vec<(Descriptor, String)>, IndexError>
where
    I: IntoIterator<Item = (AudioSignal, L)>,
    L: Into<String>,
{
    items
        .into_iter()
        .enumerate()
        .map(|(position, (signal, label))| {
            let label = label.into();
            match extractor.extract(&signal) {
                Ok(descriptor) => Ok((descriptor, label)),
                Err(err) => {
                    log::warn!(
                        "[SimilarityIndex] Bulk load aborted at item {} ({}): {}",
                        position,
                        label,
                        err
                    );
                    Err(err)
                }
            }
        })
        .collect()
}

fn ensure_finite(descriptor: &Descriptor) -> Result<(), IndexError> {
    if descriptor.is_finite() {
        Ok(())
    } else {
        Err(IndexError::InvalidAudioInput {
            reason: format!("descriptor is not finite: {:?}", descriptor.values()),
        })
    }
}
