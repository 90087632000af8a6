//! Document store trait.

use async_trait::async_trait;
use scp_core::{DocumentId, NewScp, NewTale, Scp, ScpPatch, ScpTale, TalePatch};
use scp_error::ScpArchiveResult;
use std::collections::BTreeSet;

/// Durable storage for the `scps` and `scp_tales` collections.
///
/// Every method is a single independent store call; nothing here spans
/// documents atomically. The array updates on back-reference sets must each
/// be an atomic read-modify-write of one document so concurrent callers
/// cannot lose each other's additions.
///
/// Counts returned by write methods are the number of documents actually
/// modified, so a no-op set update reports `0`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Identifier the store assigns to tales.
    type TaleId: DocumentId;

    /// Look up an SCP by key.
    async fn find_scp(&self, scp_id: &str) -> ScpArchiveResult<Option<Scp<Self::TaleId>>>;

    /// Scan SCPs in insertion order.
    async fn list_scps(&self, skip: u64, limit: u64)
    -> ScpArchiveResult<Vec<Scp<Self::TaleId>>>;

    /// Number of SCPs.
    async fn count_scps(&self) -> ScpArchiveResult<u64>;

    /// Insert an SCP with an empty back-reference set.
    ///
    /// Fails with a duplicate-key store error when the key is taken.
    async fn insert_scp(&self, scp: &NewScp) -> ScpArchiveResult<()>;

    /// Set the fields named in `patch`, leaving the others untouched.
    async fn update_scp(&self, scp_id: &str, patch: &ScpPatch) -> ScpArchiveResult<u64>;

    /// Delete an SCP.
    async fn delete_scp(&self, scp_id: &str) -> ScpArchiveResult<u64>;

    /// Add `tale_id` to the SCP's back-reference set unless already present.
    async fn add_tale_reference(
        &self,
        scp_id: &str,
        tale_id: &Self::TaleId,
    ) -> ScpArchiveResult<u64>;

    /// Remove `tale_id` from the SCP's back-reference set if present.
    async fn remove_tale_reference(
        &self,
        scp_id: &str,
        tale_id: &Self::TaleId,
    ) -> ScpArchiveResult<u64>;

    /// Overwrite the SCP's back-reference set.
    async fn replace_tale_references(
        &self,
        scp_id: &str,
        tale_ids: &BTreeSet<Self::TaleId>,
    ) -> ScpArchiveResult<u64>;

    /// Look up a tale by identifier.
    async fn find_tale(&self, id: &Self::TaleId)
    -> ScpArchiveResult<Option<ScpTale<Self::TaleId>>>;

    /// Scan tales in insertion order.
    async fn list_tales(
        &self,
        skip: u64,
        limit: u64,
    ) -> ScpArchiveResult<Vec<ScpTale<Self::TaleId>>>;

    /// Number of tales.
    async fn count_tales(&self) -> ScpArchiveResult<u64>;

    /// Insert a tale and return the identifier assigned to it.
    async fn insert_tale(&self, tale: &NewTale) -> ScpArchiveResult<Self::TaleId>;

    /// Set the fields named in `patch`, leaving the others untouched.
    async fn update_tale(&self, id: &Self::TaleId, patch: &TalePatch) -> ScpArchiveResult<u64>;

    /// Delete a tale.
    async fn delete_tale(&self, id: &Self::TaleId) -> ScpArchiveResult<u64>;

    /// Remove every occurrence of `scp_id` from the tale's reference list.
    async fn remove_scp_reference(
        &self,
        tale_id: &Self::TaleId,
        scp_id: &str,
    ) -> ScpArchiveResult<u64>;
}
