//! Reference-consistency manager for the SCP archive.
//!
//! Every mutation of either collection goes through [`ReferenceManager`],
//! which keeps each SCP's `referencing_tale_ids` the exact inverse of the
//! tales' `scp_refs` lists.
//!
//! # Consistency model
//!
//! Each operation is a short protocol of independent store calls with no
//! surrounding transaction. Validation (missing references, unknown
//! documents, empty patches) always happens before the first write, so a
//! rejected request leaves nothing behind. A store failure after a write
//! has committed is surfaced without rollback and logged at `warn` with the
//! documents involved; [`ReferenceManager::reconcile`] rebuilds every
//! back-reference set from the forward references and reports the rest.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use scp_core::{NewScp, NewTale};
//! use scp_database::MemoryStore;
//! use scp_integrity::ReferenceManager;
//!
//! let manager = ReferenceManager::new(Arc::new(MemoryStore::new()));
//! manager.create_scp(NewScp::new("SCP-173", "The Sculpture")).await?;
//! let tale = manager
//!     .create_tale(NewTale::new("Sculpted").with_scp_refs(vec!["SCP-173".into()]))
//!     .await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod manager;
mod reconcile;
mod scps;
mod tales;

pub use manager::ReferenceManager;
