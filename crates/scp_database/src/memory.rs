//! In-memory implementation of DocumentStore.
//!
//! Documents live behind a single async `RwLock`; each trait method takes the
//! lock once, so every call is atomic on its own while the multi-call
//! protocols built on top interleave exactly as they would against a real
//! database. Every call is recorded, and faults can be injected per
//! operation to exercise partially-applied protocols.

use async_trait::async_trait;
use parking_lot::Mutex;
use scp_core::{NewScp, NewTale, Scp, ScpPatch, ScpTale, TalePatch};
use scp_error::{DatabaseError, DatabaseErrorKind, ScpArchiveResult};
use scp_interface::DocumentStore;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Kind of store call, without arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum StoreOperation {
    /// `find_scp`
    FindScp,
    /// `list_scps`
    ListScps,
    /// `count_scps`
    CountScps,
    /// `insert_scp`
    InsertScp,
    /// `update_scp`
    UpdateScp,
    /// `delete_scp`
    DeleteScp,
    /// `add_tale_reference`
    AddTaleReference,
    /// `remove_tale_reference`
    RemoveTaleReference,
    /// `replace_tale_references`
    ReplaceTaleReferences,
    /// `find_tale`
    FindTale,
    /// `list_tales`
    ListTales,
    /// `count_tales`
    CountTales,
    /// `insert_tale`
    InsertTale,
    /// `update_tale`
    UpdateTale,
    /// `delete_tale`
    DeleteTale,
    /// `remove_scp_reference`
    RemoveScpReference,
}

impl StoreOperation {
    /// True for calls that can change a document.
    pub fn is_write(&self) -> bool {
        !matches!(
            self,
            Self::FindScp
                | Self::ListScps
                | Self::CountScps
                | Self::FindTale
                | Self::ListTales
                | Self::CountTales
        )
    }
}

/// A recorded store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCall {
    /// What was called
    pub operation: StoreOperation,
    /// SCP key involved, if any
    pub scp_id: Option<String>,
    /// Tale identifier involved, if any
    pub tale_id: Option<Uuid>,
}

impl StoreCall {
    fn new(operation: StoreOperation) -> Self {
        Self {
            operation,
            scp_id: None,
            tale_id: None,
        }
    }

    fn scp(mut self, scp_id: &str) -> Self {
        self.scp_id = Some(scp_id.to_string());
        self
    }

    fn tale(mut self, tale_id: Uuid) -> Self {
        self.tale_id = Some(tale_id);
        self
    }
}

#[derive(Debug, Clone)]
struct Fault {
    operation: StoreOperation,
    skip: usize,
}

#[derive(Debug, Default)]
struct Documents {
    next_seq: u64,
    scps: BTreeMap<u64, Scp<Uuid>>,
    scp_index: HashMap<String, u64>,
    tales: BTreeMap<u64, ScpTale<Uuid>>,
    tale_index: HashMap<Uuid, u64>,
}

impl Documents {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    fn scp_mut(&mut self, scp_id: &str) -> Option<&mut Scp<Uuid>> {
        let seq = *self.scp_index.get(scp_id)?;
        self.scps.get_mut(&seq)
    }

    fn tale_mut(&mut self, id: &Uuid) -> Option<&mut ScpTale<Uuid>> {
        let seq = *self.tale_index.get(id)?;
        self.tales.get_mut(&seq)
    }
}

/// Document store held entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: RwLock<Documents>,
    calls: Mutex<Vec<StoreCall>>,
    faults: Mutex<Vec<Fault>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call made so far, oldest first.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    /// Make the call of `operation` that comes after `skip` successful ones fail.
    ///
    /// Faults are one-shot; inject several to fail several calls.
    pub fn inject_fault(&self, operation: StoreOperation, skip: usize) {
        self.faults.lock().push(Fault { operation, skip });
    }

    fn record(&self, call: StoreCall) -> ScpArchiveResult<()> {
        let operation = call.operation;
        self.calls.lock().push(call);

        let mut faults = self.faults.lock();
        if let Some(index) = faults.iter().position(|f| f.operation == operation) {
            if faults[index].skip == 0 {
                faults.remove(index);
                warn!(%operation, "Injected store failure");
                return Err(DatabaseError::new(DatabaseErrorKind::Injected(
                    operation.to_string(),
                ))
                .into());
            }
            faults[index].skip -= 1;
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    type TaleId = Uuid;

    #[instrument(skip(self))]
    async fn find_scp(&self, scp_id: &str) -> ScpArchiveResult<Option<Scp<Uuid>>> {
        self.record(StoreCall::new(StoreOperation::FindScp).scp(scp_id))?;
        let docs = self.documents.read().await;
        Ok(docs
            .scp_index
            .get(scp_id)
            .and_then(|seq| docs.scps.get(seq))
            .cloned())
    }

    #[instrument(skip(self))]
    async fn list_scps(&self, skip: u64, limit: u64) -> ScpArchiveResult<Vec<Scp<Uuid>>> {
        self.record(StoreCall::new(StoreOperation::ListScps))?;
        let docs = self.documents.read().await;
        Ok(docs
            .scps
            .values()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn count_scps(&self) -> ScpArchiveResult<u64> {
        self.record(StoreCall::new(StoreOperation::CountScps))?;
        Ok(self.documents.read().await.scps.len() as u64)
    }

    #[instrument(skip(self, scp), fields(scp_id = %scp.scp_id))]
    async fn insert_scp(&self, scp: &NewScp) -> ScpArchiveResult<()> {
        self.record(StoreCall::new(StoreOperation::InsertScp).scp(&scp.scp_id))?;
        let mut docs = self.documents.write().await;
        if docs.scp_index.contains_key(&scp.scp_id) {
            return Err(DatabaseError::new(DatabaseErrorKind::DuplicateKey(scp.scp_id.clone())).into());
        }
        let seq = docs.next_seq();
        docs.scp_index.insert(scp.scp_id.clone(), seq);
        docs.scps.insert(seq, Scp::from_new(scp.clone()));
        debug!(seq, "SCP inserted");
        Ok(())
    }

    #[instrument(skip(self, patch))]
    async fn update_scp(&self, scp_id: &str, patch: &ScpPatch) -> ScpArchiveResult<u64> {
        self.record(StoreCall::new(StoreOperation::UpdateScp).scp(scp_id))?;
        let mut docs = self.documents.write().await;
        Ok(match docs.scp_mut(scp_id) {
            Some(scp) => {
                scp.apply(patch);
                1
            }
            None => 0,
        })
    }

    #[instrument(skip(self))]
    async fn delete_scp(&self, scp_id: &str) -> ScpArchiveResult<u64> {
        self.record(StoreCall::new(StoreOperation::DeleteScp).scp(scp_id))?;
        let mut docs = self.documents.write().await;
        Ok(match docs.scp_index.remove(scp_id) {
            Some(seq) => {
                docs.scps.remove(&seq);
                1
            }
            None => 0,
        })
    }

    #[instrument(skip(self))]
    async fn add_tale_reference(&self, scp_id: &str, tale_id: &Uuid) -> ScpArchiveResult<u64> {
        self.record(
            StoreCall::new(StoreOperation::AddTaleReference)
                .scp(scp_id)
                .tale(*tale_id),
        )?;
        let mut docs = self.documents.write().await;
        let added = docs
            .scp_mut(scp_id)
            .is_some_and(|scp| scp.referencing_tale_ids.insert(*tale_id));
        Ok(u64::from(added))
    }

    #[instrument(skip(self))]
    async fn remove_tale_reference(&self, scp_id: &str, tale_id: &Uuid) -> ScpArchiveResult<u64> {
        self.record(
            StoreCall::new(StoreOperation::RemoveTaleReference)
                .scp(scp_id)
                .tale(*tale_id),
        )?;
        let mut docs = self.documents.write().await;
        let removed = docs
            .scp_mut(scp_id)
            .is_some_and(|scp| scp.referencing_tale_ids.remove(tale_id));
        Ok(u64::from(removed))
    }

    #[instrument(skip(self, tale_ids), fields(count = tale_ids.len()))]
    async fn replace_tale_references(
        &self,
        scp_id: &str,
        tale_ids: &BTreeSet<Uuid>,
    ) -> ScpArchiveResult<u64> {
        self.record(StoreCall::new(StoreOperation::ReplaceTaleReferences).scp(scp_id))?;
        let mut docs = self.documents.write().await;
        Ok(match docs.scp_mut(scp_id) {
            Some(scp) => {
                scp.referencing_tale_ids = tale_ids.clone();
                1
            }
            None => 0,
        })
    }

    #[instrument(skip(self))]
    async fn find_tale(&self, id: &Uuid) -> ScpArchiveResult<Option<ScpTale<Uuid>>> {
        self.record(StoreCall::new(StoreOperation::FindTale).tale(*id))?;
        let docs = self.documents.read().await;
        Ok(docs
            .tale_index
            .get(id)
            .and_then(|seq| docs.tales.get(seq))
            .cloned())
    }

    #[instrument(skip(self))]
    async fn list_tales(&self, skip: u64, limit: u64) -> ScpArchiveResult<Vec<ScpTale<Uuid>>> {
        self.record(StoreCall::new(StoreOperation::ListTales))?;
        let docs = self.documents.read().await;
        Ok(docs
            .tales
            .values()
            .skip(usize::try_from(skip).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    #[instrument(skip(self))]
    async fn count_tales(&self) -> ScpArchiveResult<u64> {
        self.record(StoreCall::new(StoreOperation::CountTales))?;
        Ok(self.documents.read().await.tales.len() as u64)
    }

    #[instrument(skip(self, tale), fields(refs = tale.scp_refs.len()))]
    async fn insert_tale(&self, tale: &NewTale) -> ScpArchiveResult<Uuid> {
        self.record(StoreCall::new(StoreOperation::InsertTale))?;
        let id = Uuid::new_v4();
        let mut docs = self.documents.write().await;
        let seq = docs.next_seq();
        docs.tale_index.insert(id, seq);
        docs.tales.insert(seq, ScpTale::from_new(id, tale.clone()));
        debug!(%id, seq, "Tale inserted");
        Ok(id)
    }

    #[instrument(skip(self, patch))]
    async fn update_tale(&self, id: &Uuid, patch: &TalePatch) -> ScpArchiveResult<u64> {
        self.record(StoreCall::new(StoreOperation::UpdateTale).tale(*id))?;
        let mut docs = self.documents.write().await;
        Ok(match docs.tale_mut(id) {
            Some(tale) => {
                tale.apply(patch);
                1
            }
            None => 0,
        })
    }

    #[instrument(skip(self))]
    async fn delete_tale(&self, id: &Uuid) -> ScpArchiveResult<u64> {
        self.record(StoreCall::new(StoreOperation::DeleteTale).tale(*id))?;
        let mut docs = self.documents.write().await;
        Ok(match docs.tale_index.remove(id) {
            Some(seq) => {
                docs.tales.remove(&seq);
                1
            }
            None => 0,
        })
    }

    #[instrument(skip(self))]
    async fn remove_scp_reference(&self, tale_id: &Uuid, scp_id: &str) -> ScpArchiveResult<u64> {
        self.record(
            StoreCall::new(StoreOperation::RemoveScpReference)
                .scp(scp_id)
                .tale(*tale_id),
        )?;
        let mut docs = self.documents.write().await;
        Ok(match docs.tale_mut(tale_id) {
            Some(tale) if tale.scp_refs.iter().any(|key| key == scp_id) => {
                tale.scp_refs.retain(|key| key != scp_id);
                1
            }
            _ => 0,
        })
    }
}
