//! Reconcile running while other requests change the store.

mod test_utils;

use async_trait::async_trait;
use scp_core::{NewScp, NewTale, Scp, ScpDeletePolicy, ScpPatch, ScpTale, TalePatch};
use scp_database::MemoryStore;
use scp_error::ScpArchiveResult;
use scp_integrity::ReferenceManager;
use scp_interface::DocumentStore;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use test_utils::{assert_consistent, refs, seed_scps};
use uuid::Uuid;

/// Work a second client performs part-way through a scan.
#[derive(Debug, Clone)]
enum Interference {
    /// Create a tale referencing the key on the first SCP listing.
    CreateTaleOnScpScan(String),
    /// Delete the tale on the second tale listing, shifting the scan offsets.
    DeleteTaleOnSecondTaleScan(Uuid),
}

/// Delegates to a memory store, running one interfering request through its
/// own manager at the configured point.
struct InterleavedStore {
    inner: Arc<MemoryStore>,
    other_client: ReferenceManager<MemoryStore>,
    interference: Interference,
    scp_listings: AtomicUsize,
    tale_listings: AtomicUsize,
}

impl InterleavedStore {
    fn new(inner: Arc<MemoryStore>, interference: Interference) -> Self {
        Self {
            other_client: ReferenceManager::new(Arc::clone(&inner)),
            inner,
            interference,
            scp_listings: AtomicUsize::new(0),
            tale_listings: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DocumentStore for InterleavedStore {
    type TaleId = Uuid;

    async fn find_scp(&self, scp_id: &str) -> ScpArchiveResult<Option<Scp<Uuid>>> {
        self.inner.find_scp(scp_id).await
    }

    async fn list_scps(&self, skip: u64, limit: u64) -> ScpArchiveResult<Vec<Scp<Uuid>>> {
        let listing = self.scp_listings.fetch_add(1, Ordering::SeqCst);
        if let (0, Interference::CreateTaleOnScpScan(key)) = (listing, &self.interference) {
            self.other_client
                .create_tale(NewTale::new("Late arrival").with_scp_refs(refs(&[key.as_str()])))
                .await?;
        }
        self.inner.list_scps(skip, limit).await
    }

    async fn count_scps(&self) -> ScpArchiveResult<u64> {
        self.inner.count_scps().await
    }

    async fn insert_scp(&self, scp: &NewScp) -> ScpArchiveResult<()> {
        self.inner.insert_scp(scp).await
    }

    async fn update_scp(&self, scp_id: &str, patch: &ScpPatch) -> ScpArchiveResult<u64> {
        self.inner.update_scp(scp_id, patch).await
    }

    async fn delete_scp(&self, scp_id: &str) -> ScpArchiveResult<u64> {
        self.inner.delete_scp(scp_id).await
    }

    async fn add_tale_reference(&self, scp_id: &str, tale_id: &Uuid) -> ScpArchiveResult<u64> {
        self.inner.add_tale_reference(scp_id, tale_id).await
    }

    async fn remove_tale_reference(&self, scp_id: &str, tale_id: &Uuid) -> ScpArchiveResult<u64> {
        self.inner.remove_tale_reference(scp_id, tale_id).await
    }

    async fn replace_tale_references(
        &self,
        scp_id: &str,
        tale_ids: &BTreeSet<Uuid>,
    ) -> ScpArchiveResult<u64> {
        self.inner.replace_tale_references(scp_id, tale_ids).await
    }

    async fn find_tale(&self, id: &Uuid) -> ScpArchiveResult<Option<ScpTale<Uuid>>> {
        self.inner.find_tale(id).await
    }

    async fn list_tales(&self, skip: u64, limit: u64) -> ScpArchiveResult<Vec<ScpTale<Uuid>>> {
        let listing = self.tale_listings.fetch_add(1, Ordering::SeqCst);
        if let (1, Interference::DeleteTaleOnSecondTaleScan(id)) = (listing, &self.interference) {
            self.other_client.delete_tale(id).await?;
        }
        self.inner.list_tales(skip, limit).await
    }

    async fn count_tales(&self) -> ScpArchiveResult<u64> {
        self.inner.count_tales().await
    }

    async fn insert_tale(&self, tale: &NewTale) -> ScpArchiveResult<Uuid> {
        self.inner.insert_tale(tale).await
    }

    async fn update_tale(&self, id: &Uuid, patch: &TalePatch) -> ScpArchiveResult<u64> {
        self.inner.update_tale(id, patch).await
    }

    async fn delete_tale(&self, id: &Uuid) -> ScpArchiveResult<u64> {
        self.inner.delete_tale(id).await
    }

    async fn remove_scp_reference(&self, tale_id: &Uuid, scp_id: &str) -> ScpArchiveResult<u64> {
        self.inner.remove_scp_reference(tale_id, scp_id).await
    }
}

fn inner_manager(store: &Arc<MemoryStore>) -> ReferenceManager<MemoryStore> {
    ReferenceManager::new(Arc::clone(store)).with_delete_policy(ScpDeletePolicy::Tolerate)
}

#[tokio::test]
async fn test_reconcile_keeps_tale_created_during_scan() {
    let inner = Arc::new(MemoryStore::new());
    let manager = inner_manager(&inner);
    seed_scps(&manager, &["001"]).await;

    let racing = ReferenceManager::new(Arc::new(InterleavedStore::new(
        Arc::clone(&inner),
        Interference::CreateTaleOnScpScan("001".to_string()),
    )));
    let report = racing.reconcile().await.unwrap();

    assert!(report.repaired_scps.is_empty());
    assert_eq!(report.tales_scanned, 0);
    let scp = manager.get_scp("001").await.unwrap();
    assert_eq!(scp.referencing_tale_ids.len(), 1);
    assert_consistent(&manager).await;
}

#[tokio::test]
async fn test_reconcile_keeps_tales_skipped_by_shifted_scan() {
    let inner = Arc::new(MemoryStore::new());
    let manager = inner_manager(&inner);
    seed_scps(&manager, &["001"]).await;
    let mut ids = Vec::new();
    for n in 0..120 {
        let tale = manager
            .create_tale(NewTale::new(format!("Tale {}", n)).with_scp_refs(refs(&["001"])))
            .await
            .unwrap();
        ids.push(tale.id);
    }

    let racing = ReferenceManager::new(Arc::new(InterleavedStore::new(
        Arc::clone(&inner),
        Interference::DeleteTaleOnSecondTaleScan(ids[0]),
    )));
    let report = racing.reconcile().await.unwrap();

    // The deletion moved tale 100 behind the scan offset, so it was never read.
    assert_eq!(report.tales_scanned, 119);
    assert!(report.repaired_scps.is_empty());
    let scp = manager.get_scp("001").await.unwrap();
    assert_eq!(scp.referencing_tale_ids.len(), 119);
    assert!(scp.referencing_tale_ids.contains(&ids[100]));
    assert_consistent(&manager).await;
}

#[tokio::test]
async fn test_reconcile_still_repairs_real_drift_under_interference() {
    let inner = Arc::new(MemoryStore::new());
    let manager = inner_manager(&inner);
    seed_scps(&manager, &["001", "002"]).await;
    let tale = manager
        .create_tale(NewTale::new("Drifted").with_scp_refs(refs(&["002"])))
        .await
        .unwrap();
    inner
        .replace_tale_references("002", &BTreeSet::new())
        .await
        .unwrap();
    let ghost = Uuid::new_v4();
    inner.add_tale_reference("001", &ghost).await.unwrap();

    let racing = ReferenceManager::new(Arc::new(InterleavedStore::new(
        Arc::clone(&inner),
        Interference::CreateTaleOnScpScan("001".to_string()),
    )));
    let report = racing.reconcile().await.unwrap();

    assert_eq!(report.repaired_scps, refs(&["001", "002"]));
    let first = manager.get_scp("001").await.unwrap();
    assert!(!first.referencing_tale_ids.contains(&ghost));
    assert_eq!(first.referencing_tale_ids.len(), 1);
    let second = manager.get_scp("002").await.unwrap();
    assert!(second.referencing_tale_ids.contains(&tale.id));
    assert_consistent(&manager).await;
}
