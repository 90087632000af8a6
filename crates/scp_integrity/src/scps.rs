//! SCP lifecycle.

use crate::ReferenceManager;
use scp_core::{NewScp, Scp, ScpDeletePolicy, ScpPatch};
use scp_error::{ReferenceError, ReferenceErrorKind, ScpArchiveResult};
use scp_interface::DocumentStore;
use tracing::{debug, info, instrument, warn};

impl<S: DocumentStore> ReferenceManager<S> {
    /// Create an SCP with an empty back-reference set.
    #[instrument(skip(self, scp), fields(scp_id = %scp.scp_id))]
    pub async fn create_scp(&self, scp: NewScp) -> ScpArchiveResult<Scp<S::TaleId>> {
        scp.validate()?;
        if self.store.find_scp(&scp.scp_id).await?.is_some() {
            return Err(
                ReferenceError::new(ReferenceErrorKind::ScpAlreadyExists(scp.scp_id)).into(),
            );
        }

        self.store.insert_scp(&scp).await?;
        info!("SCP created");
        Ok(Scp::from_new(scp))
    }

    /// Apply a merge patch to an SCP's descriptive fields.
    #[instrument(skip(self, patch))]
    pub async fn update_scp(
        &self,
        scp_id: &str,
        patch: ScpPatch,
    ) -> ScpArchiveResult<Scp<S::TaleId>> {
        if patch.is_empty() {
            return Err(ReferenceError::new(ReferenceErrorKind::NoFieldsProvided).into());
        }
        patch.validate()?;

        if self.store.update_scp(scp_id, &patch).await? == 0 {
            return Err(
                ReferenceError::new(ReferenceErrorKind::ScpNotFound(scp_id.to_string())).into(),
            );
        }
        info!("SCP updated");
        self.get_scp(scp_id).await
    }

    /// Delete an SCP under the configured [`ScpDeletePolicy`].
    ///
    /// - `Tolerate` deletes it and leaves referencing tales with a dangling key.
    /// - `Block` refuses while any tale references it.
    /// - `Cascade` deletes it, then strips the key from every referencing tale.
    ///
    /// Returns the deleted document.
    #[instrument(skip(self), fields(policy = %self.delete_policy))]
    pub async fn delete_scp(&self, scp_id: &str) -> ScpArchiveResult<Scp<S::TaleId>> {
        let scp = self.get_scp(scp_id).await?;
        let referencing = scp.referencing_tale_ids.len();

        if self.delete_policy == ScpDeletePolicy::Block && referencing > 0 {
            return Err(ReferenceError::new(ReferenceErrorKind::ScpStillReferenced {
                scp_id: scp_id.to_string(),
                tale_count: referencing,
            })
            .into());
        }

        if self.store.delete_scp(scp_id).await? == 0 {
            return Err(
                ReferenceError::new(ReferenceErrorKind::ScpNotFound(scp_id.to_string())).into(),
            );
        }

        match self.delete_policy {
            ScpDeletePolicy::Cascade => {
                for tale_id in &scp.referencing_tale_ids {
                    if let Err(e) = self.store.remove_scp_reference(tale_id, scp_id).await {
                        warn!(tale_id = %tale_id, error = %e, "SCP deleted but tale still references it");
                        return Err(e);
                    }
                }
                debug!(tales = referencing, "Stripped key from referencing tales");
            }
            ScpDeletePolicy::Tolerate if referencing > 0 => {
                warn!(tales = referencing, "SCP deleted while still referenced");
            }
            _ => {}
        }

        info!("SCP deleted");
        Ok(scp)
    }
}
