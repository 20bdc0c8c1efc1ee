// Record types stored by the similarity index

use serde::Serialize;

use crate::analysis::Descriptor;

/// One indexed clip
///
/// Label and descriptor live in the same record, so the two can never drift
/// out of alignment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub id: u64,
    pub label: String,
    pub descriptor: Descriptor,
}

/// One nearest-neighbor result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub id: u64,
    pub label: String,
    /// L1 distance between the query descriptor and this record's descriptor
    pub distance: f32,
}
