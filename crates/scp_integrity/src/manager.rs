//! The manager handle, reference validation and reads.

use scp_core::{Page, PageRequest, Scp, ScpDeletePolicy, ScpTale};
use scp_error::{ReferenceError, ReferenceErrorKind, ScpArchiveResult};
use scp_interface::DocumentStore;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Mediates every write to the `scps` and `scp_tales` collections.
///
/// The manager owns no persistent state. It holds an injected store handle
/// and the policy applied when an SCP that tales still reference is deleted;
/// cloning it shares the store.
///
/// # Example
///
/// ```rust,ignore
/// use scp_core::ScpDeletePolicy;
/// use scp_integrity::ReferenceManager;
///
/// let manager = ReferenceManager::new(store).with_delete_policy(ScpDeletePolicy::Cascade);
/// ```
#[derive(Debug)]
pub struct ReferenceManager<S: DocumentStore> {
    pub(crate) store: Arc<S>,
    pub(crate) delete_policy: ScpDeletePolicy,
}

impl<S: DocumentStore> Clone for ReferenceManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            delete_policy: self.delete_policy,
        }
    }
}

impl<S: DocumentStore> ReferenceManager<S> {
    /// Create a manager over `store` with the default delete policy.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            delete_policy: ScpDeletePolicy::default(),
        }
    }

    /// Set the policy applied when deleting a referenced SCP.
    pub fn with_delete_policy(mut self, policy: ScpDeletePolicy) -> Self {
        self.delete_policy = policy;
        self
    }

    /// The active delete policy.
    pub fn delete_policy(&self) -> ScpDeletePolicy {
        self.delete_policy
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Return the keys in `keys` that name no existing SCP.
    ///
    /// Order and duplicates in `keys` do not matter; each distinct key is
    /// looked up once. An empty result means every reference is valid.
    #[instrument(skip(self, keys), fields(keys = keys.len()))]
    pub async fn validate_references(&self, keys: &[String]) -> ScpArchiveResult<BTreeSet<String>> {
        let distinct: BTreeSet<&String> = keys.iter().collect();
        let mut missing = BTreeSet::new();
        for key in distinct {
            if self.store.find_scp(key).await?.is_none() {
                missing.insert(key.clone());
            }
        }
        debug!(missing = missing.len(), "References validated");
        Ok(missing)
    }

    /// Fail with `MissingReferences` unless every key names an SCP.
    pub(crate) async fn require_references(&self, keys: &[String]) -> ScpArchiveResult<()> {
        let missing = self.validate_references(keys).await?;
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ReferenceError::new(ReferenceErrorKind::MissingReferences(
                missing.into_iter().collect(),
            ))
            .into())
        }
    }

    /// Fetch an SCP by key.
    #[instrument(skip(self))]
    pub async fn get_scp(&self, scp_id: &str) -> ScpArchiveResult<Scp<S::TaleId>> {
        self.store
            .find_scp(scp_id)
            .await?
            .ok_or_else(|| ReferenceError::new(ReferenceErrorKind::ScpNotFound(scp_id.to_string())).into())
    }

    /// Fetch a tale by identifier.
    #[instrument(skip(self, id), fields(tale_id = %id))]
    pub async fn get_tale(&self, id: &S::TaleId) -> ScpArchiveResult<ScpTale<S::TaleId>> {
        self.store
            .find_tale(id)
            .await?
            .ok_or_else(|| ReferenceError::new(ReferenceErrorKind::TaleNotFound(id.to_string())).into())
    }

    /// One page of SCPs in insertion order.
    #[instrument(skip(self))]
    pub async fn list_scps(&self, request: PageRequest) -> ScpArchiveResult<Page<Scp<S::TaleId>>> {
        let data = self.store.list_scps(request.skip(), *request.limit()).await?;
        let total = self.store.count_scps().await?;
        Ok(Page::new(data, request, total))
    }

    /// One page of tales in insertion order.
    #[instrument(skip(self))]
    pub async fn list_tales(
        &self,
        request: PageRequest,
    ) -> ScpArchiveResult<Page<ScpTale<S::TaleId>>> {
        let data = self.store.list_tales(request.skip(), *request.limit()).await?;
        let total = self.store.count_tales().await?;
        Ok(Page::new(data, request, total))
    }
}
