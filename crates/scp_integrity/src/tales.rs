//! Tale write protocols.

use crate::ReferenceManager;
use scp_core::{NewTale, ScpTale, TalePatch};
use scp_error::{ReferenceError, ReferenceErrorKind, ScpArchiveResult};
use scp_interface::DocumentStore;
use std::collections::BTreeSet;
use tracing::{debug, info, instrument, warn};

impl<S: DocumentStore> ReferenceManager<S> {
    /// Create a tale and register it with every SCP it references.
    ///
    /// Fails with `MissingReferences` before any write when a referenced key
    /// does not exist. If a back-reference update fails after the insert,
    /// the tale is kept and the error is returned.
    #[instrument(skip(self, tale), fields(title = %tale.title, refs = tale.scp_refs.len()))]
    pub async fn create_tale(&self, tale: NewTale) -> ScpArchiveResult<ScpTale<S::TaleId>> {
        tale.validate()?;
        self.require_references(&tale.scp_refs).await?;

        let id = self.store.insert_tale(&tale).await?;
        let created = ScpTale::from_new(id, tale);
        debug!(tale_id = %created.id, "Tale inserted");

        for scp_id in created.referenced_keys() {
            if let Err(e) = self.store.add_tale_reference(&scp_id, &created.id).await {
                warn!(
                    tale_id = %created.id,
                    scp_id = %scp_id,
                    error = %e,
                    "Tale created but back-reference not recorded"
                );
                return Err(e);
            }
        }

        info!(tale_id = %created.id, "Tale created");
        Ok(created)
    }

    /// Apply a merge patch to a tale and move its back-references.
    ///
    /// When the patch replaces `scp_refs`, the tale is removed from the SCPs
    /// it no longer names and added to the ones it newly names; SCPs named
    /// both before and after are not touched.
    #[instrument(skip(self, id, patch), fields(tale_id = %id))]
    pub async fn update_tale(
        &self,
        id: &S::TaleId,
        patch: TalePatch,
    ) -> ScpArchiveResult<ScpTale<S::TaleId>> {
        if patch.is_empty() {
            return Err(ReferenceError::new(ReferenceErrorKind::NoFieldsProvided).into());
        }
        patch.validate()?;

        let mut tale = self.get_tale(id).await?;
        if let Some(refs) = &patch.scp_refs {
            self.require_references(refs).await?;
        }

        if self.store.update_tale(id, &patch).await? == 0 {
            // Deleted between the lookup and the write.
            return Err(ReferenceError::new(ReferenceErrorKind::TaleNotFound(id.to_string())).into());
        }
        let old_keys = tale.referenced_keys();
        tale.apply(&patch);

        if patch.scp_refs.is_some() {
            let new_keys = tale.referenced_keys();
            let removed: BTreeSet<&String> = old_keys.difference(&new_keys).collect();
            let added: BTreeSet<&String> = new_keys.difference(&old_keys).collect();
            debug!(removed = removed.len(), added = added.len(), "Moving back-references");

            for scp_id in removed {
                if let Err(e) = self.store.remove_tale_reference(scp_id, id).await {
                    warn!(tale_id = %id, scp_id = %scp_id, error = %e, "Tale updated but stale back-reference kept");
                    return Err(e);
                }
            }
            for scp_id in added {
                if let Err(e) = self.store.add_tale_reference(scp_id, id).await {
                    warn!(tale_id = %id, scp_id = %scp_id, error = %e, "Tale updated but back-reference not recorded");
                    return Err(e);
                }
            }
        }

        info!("Tale updated");
        Ok(tale)
    }

    /// Delete a tale, then remove it from every SCP it referenced.
    ///
    /// Returns the deleted document.
    #[instrument(skip(self, id), fields(tale_id = %id))]
    pub async fn delete_tale(&self, id: &S::TaleId) -> ScpArchiveResult<ScpTale<S::TaleId>> {
        let tale = self.get_tale(id).await?;

        if self.store.delete_tale(id).await? == 0 {
            return Err(ReferenceError::new(ReferenceErrorKind::TaleNotFound(id.to_string())).into());
        }

        for scp_id in tale.referenced_keys() {
            if let Err(e) = self.store.remove_tale_reference(&scp_id, id).await {
                warn!(tale_id = %id, scp_id = %scp_id, error = %e, "Tale deleted but back-reference left dangling");
                return Err(e);
            }
        }

        info!("Tale deleted");
        Ok(tale)
    }
}
