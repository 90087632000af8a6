//! Back-reference audit and repair.

use crate::ReferenceManager;
use scp_core::{DanglingReference, ReconcileReport};
use scp_error::ScpArchiveResult;
use scp_interface::DocumentStore;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument, warn};

/// Documents fetched per scan call.
const SCAN_BATCH: u64 = 100;

impl<S: DocumentStore> ReferenceManager<S> {
    /// Report every inconsistency between forward and back references
    /// without writing anything.
    ///
    /// `repaired_scps` lists the SCPs whose back-reference set differs from
    /// the one implied by the live tales.
    #[instrument(skip(self))]
    pub async fn audit(&self) -> ScpArchiveResult<ReconcileReport<S::TaleId>> {
        self.scan(false).await
    }

    /// Recompute every SCP's back-reference set from the live tales and
    /// correct the ones that differ.
    ///
    /// Forward references to missing SCPs cannot be repaired here and are
    /// reported as dangling. Running it twice in a row repairs nothing the
    /// second time.
    #[instrument(skip(self))]
    pub async fn reconcile(&self) -> ScpArchiveResult<ReconcileReport<S::TaleId>> {
        let report = self.scan(true).await?;
        info!(
            repaired = report.repaired_scps.len(),
            dangling = report.dangling_references.len(),
            "Reconcile finished"
        );
        Ok(report)
    }

    async fn scan(&self, repair: bool) -> ScpArchiveResult<ReconcileReport<S::TaleId>> {
        let mut expected: BTreeMap<String, BTreeSet<S::TaleId>> = BTreeMap::new();
        let mut tales_scanned = 0;
        loop {
            let batch = self.store.list_tales(tales_scanned, SCAN_BATCH).await?;
            let fetched = batch.len() as u64;
            for tale in batch {
                for scp_id in tale.referenced_keys() {
                    expected.entry(scp_id).or_default().insert(tale.id.clone());
                }
            }
            tales_scanned += fetched;
            if fetched < SCAN_BATCH {
                break;
            }
        }

        let mut repaired_scps = Vec::new();
        let mut scps_scanned = 0;
        loop {
            let batch = self.store.list_scps(scps_scanned, SCAN_BATCH).await?;
            let fetched = batch.len() as u64;
            for scp in batch {
                let wanted = expected.remove(&scp.scp_id).unwrap_or_default();
                if wanted == scp.referencing_tale_ids {
                    continue;
                }
                let corrected = self
                    .correct_back_references(
                        &scp.scp_id,
                        &scp.referencing_tale_ids,
                        &wanted,
                        repair,
                    )
                    .await?;
                if corrected {
                    repaired_scps.push(scp.scp_id);
                }
            }
            scps_scanned += fetched;
            if fetched < SCAN_BATCH {
                break;
            }
        }

        // Whatever is left was referenced by a tale but matched no SCP.
        let mut dangling_references: Vec<_> = expected
            .into_iter()
            .flat_map(|(scp_id, tale_ids)| {
                tale_ids.into_iter().map(move |tale_id| DanglingReference {
                    tale_id,
                    scp_id: scp_id.clone(),
                })
            })
            .collect();
        dangling_references.sort();

        if !dangling_references.is_empty() {
            warn!(count = dangling_references.len(), "Tales reference missing SCPs");
        }

        Ok(ReconcileReport {
            tales_scanned,
            scps_scanned,
            repaired_scps,
            dangling_references,
        })
    }

    /// Apply the difference between the stored and expected back-reference
    /// sets of one SCP, one id at a time.
    ///
    /// Both scans are snapshots, so each id is checked against the live tale
    /// before anything is written: a tale created or skipped during the scan
    /// keeps its back-reference. Returns whether any id needed correcting.
    async fn correct_back_references(
        &self,
        scp_id: &str,
        stored: &BTreeSet<S::TaleId>,
        wanted: &BTreeSet<S::TaleId>,
        repair: bool,
    ) -> ScpArchiveResult<bool> {
        let mut corrected = false;
        for tale_id in stored.symmetric_difference(wanted) {
            let references = self
                .store
                .find_tale(tale_id)
                .await?
                .is_some_and(|tale| tale.scp_refs.iter().any(|key| key == scp_id));
            if references == stored.contains(tale_id) {
                debug!(scp_id, tale_id = %tale_id, "Back-reference changed during scan");
                continue;
            }
            corrected = true;
            if !repair {
                continue;
            }
            if references {
                self.store.add_tale_reference(scp_id, tale_id).await?;
            } else {
                self.store.remove_tale_reference(scp_id, tale_id).await?;
            }
        }
        Ok(corrected)
    }
}
