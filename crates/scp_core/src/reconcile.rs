//! Outcome of a back-reference repair pass.

use crate::DocumentId;
use serde::{Deserialize, Serialize};

/// A tale pointing at an SCP key that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DanglingReference<Id: DocumentId> {
    /// The referencing tale
    pub tale_id: Id,
    /// The missing SCP key
    pub scp_id: String,
}

/// Summary of a reconcile pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport<Id: DocumentId> {
    /// Tales scanned
    pub tales_scanned: u64,
    /// SCPs scanned
    pub scps_scanned: u64,
    /// SCPs whose back-reference set needed correcting
    pub repaired_scps: Vec<String>,
    /// Forward references with no matching SCP (left untouched)
    pub dangling_references: Vec<DanglingReference<Id>>,
}

impl<Id: DocumentId> ReconcileReport<Id> {
    /// True when the pass found nothing to repair or report.
    pub fn is_consistent(&self) -> bool {
        self.repaired_scps.is_empty() && self.dangling_references.is_empty()
    }
}
